//! Azure Resource Manager access.
//!
//! - [`ResourceManager`] - the operations the sample needs, as one trait
//! - [`arm`] - `reqwest` implementation against the ARM REST API
//! - [`auth`] - bearer tokens from `azure_identity`
//! - [`lro`] - long-running operation polling helpers

pub mod arm;
pub mod auth;
pub mod lro;

use crate::error::Result;
use crate::models::{
    Connection, LocalNetworkGateway, PublicIpAddress, ResourceGroup, VirtualNetwork,
    VirtualNetworkGateway,
};
use async_trait::async_trait;

// Re-export public types
pub use arm::{ArmClient, NETWORK_API_VERSION, RESOURCES_API_VERSION};
pub use auth::{ServicePrincipal, StaticToken, TokenSource};
pub use lro::{Operation, PollTarget, WaitUntil};

/// Remote operations used by the sample.
///
/// Every `create_*` call returns once ARM reports the resource provisioned.
/// [`begin_reset_vpn_gateway`](Self::begin_reset_vpn_gateway) only starts the reset.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    async fn create_resource_group(&self, name: &str, group: &ResourceGroup)
        -> Result<ResourceGroup>;

    async fn create_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        network: &VirtualNetwork,
    ) -> Result<VirtualNetwork>;

    async fn create_public_ip(
        &self,
        resource_group: &str,
        name: &str,
        public_ip: &PublicIpAddress,
    ) -> Result<PublicIpAddress>;

    async fn create_vpn_gateway(
        &self,
        resource_group: &str,
        name: &str,
        gateway: &VirtualNetworkGateway,
    ) -> Result<VirtualNetworkGateway>;

    async fn create_local_network_gateway(
        &self,
        resource_group: &str,
        name: &str,
        gateway: &LocalNetworkGateway,
    ) -> Result<LocalNetworkGateway>;

    async fn create_connection(
        &self,
        resource_group: &str,
        name: &str,
        connection: &Connection,
    ) -> Result<Connection>;

    /// All gateway connections in the resource group.
    async fn list_connections(&self, resource_group: &str) -> Result<Vec<Connection>>;

    /// Start a gateway reset without waiting for it to finish.
    async fn begin_reset_vpn_gateway(&self, resource_group: &str, name: &str) -> Result<Operation>;

    /// Delete the resource group and everything in it, waiting for completion.
    async fn delete_resource_group(&self, name: &str) -> Result<()>;
}
