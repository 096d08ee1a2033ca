//! Data models for the ARM resources the sample creates.
//!
//! - [`Ipv4`] - IPv4 network in CIDR notation
//! - [`Resource`] and [`ResourceId`] - generic ARM envelope and identifiers
//! - [`network`] - resource group, virtual network, public IP
//! - [`gateway`] - VPN gateway, local network gateway, connection

pub mod gateway;
mod ipv4;
pub mod network;
mod resource;

// Re-export public types
pub use gateway::{
    Connection, ConnectionType, GatewayType, LocalNetworkGateway, VirtualNetworkGateway, VpnType,
};
pub use ipv4::{broadcast_addr, cut_addr, get_cidr_mask, num_az_hosts, Ipv4, MAX_LENGTH};
pub use network::{
    AddressSpace, AllocationMethod, PublicIpAddress, ResourceGroup, Subnet, VirtualNetwork,
    GATEWAY_SUBNET_NAME,
};
pub use resource::{Page, ProvisioningState, Resource, ResourceId, Sku, SubResource};
