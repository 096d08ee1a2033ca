//! Console output for created resources.
//!
//! - [`terminal`] - human-readable resource summaries

mod terminal;

pub use terminal::{
    format_connection, format_local_gateway, format_virtual_network, format_vpn_gateway,
    print_connection, print_local_gateway, print_virtual_network, print_vpn_gateway,
};
