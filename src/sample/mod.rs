//! The provisioning run.
//!
//! Creates a virtual network with a gateway subnet, a public IP, a route-based
//! VPN gateway, a local network gateway and a site-to-site connection, lists
//! the connections, starts a gateway reset, then deletes the resource group.

mod scope;

pub use scope::{Cleanup, ResourceGroupScope};

use crate::azure::{Operation, ResourceManager};
use crate::config::Settings;
use crate::error::Result;
use crate::models::{
    AllocationMethod, Connection, LocalNetworkGateway, PublicIpAddress, ResourceGroup,
    VirtualNetwork, VirtualNetworkGateway, GATEWAY_SUBNET_NAME,
};
use crate::names::SampleNames;
use crate::output;

/// Resources created by a successful run.
#[derive(Debug)]
pub struct Provisioned {
    pub virtual_network: VirtualNetwork,
    pub public_ip: PublicIpAddress,
    pub vpn_gateway: VirtualNetworkGateway,
    pub local_gateway: LocalNetworkGateway,
    pub connection: Connection,
    /// Connections listed in the resource group after creation.
    pub connections: Vec<Connection>,
    /// Reset that was started but not awaited.
    pub reset: Operation,
}

/// Outcome of one run: fatal provisioning result plus advisory cleanup.
#[derive(Debug)]
pub struct SampleRun {
    pub provisioning: Result<Provisioned>,
    pub cleanup: Cleanup,
}

impl SampleRun {
    /// Drop the advisory tier; it was already logged.
    pub fn into_result(self) -> Result<Provisioned> {
        self.provisioning
    }
}

/// Request body for the run's resource group.
pub fn resource_group_request(settings: &Settings) -> ResourceGroup {
    ResourceGroup::new(&settings.location, Default::default())
        .with_tag("createdBy", env!("CARGO_PKG_NAME"))
        .with_tag("createdAt", chrono::Utc::now().to_rfc3339())
}

/// Provision the VPN topology and always try to delete the resource group.
pub async fn run_sample<A>(arm: &A, settings: &Settings, names: &SampleNames) -> SampleRun
where
    A: ResourceManager + ?Sized,
{
    if let Err(err) = names.validate() {
        log::error!("{err}");
        return SampleRun {
            provisioning: Err(err),
            cleanup: Cleanup::NotNeeded,
        };
    }

    let group = resource_group_request(settings);
    let scope = match ResourceGroupScope::acquire(arm, &names.resource_group, &group).await {
        Ok(scope) => scope,
        Err(err) => {
            log::error!("Failed to create resource group {}: {err}", names.resource_group);
            log::info!("Did not create any resources in Azure. No clean up is necessary");
            return SampleRun {
                provisioning: Err(err),
                cleanup: Cleanup::NotNeeded,
            };
        }
    };

    let provisioning = provision(arm, settings, names, scope.name()).await;
    if let Err(err) = &provisioning {
        log::error!("Provisioning failed: {err}");
    }

    let cleanup = scope.release(arm).await;
    SampleRun {
        provisioning,
        cleanup,
    }
}

/// Everything after the resource group, in dependency order.
async fn provision<A>(
    arm: &A,
    settings: &Settings,
    names: &SampleNames,
    resource_group: &str,
) -> Result<Provisioned>
where
    A: ResourceManager + ?Sized,
{
    let location = settings.location.as_str();

    //============================================================
    // Create virtual network
    log::info!("Creating virtual network...");
    let request = VirtualNetwork::with_gateway_subnet(
        location,
        settings.vnet_address_space,
        settings.gateway_subnet,
    );
    let virtual_network = arm
        .create_virtual_network(resource_group, &names.virtual_network, &request)
        .await?;
    log::info!("Created network {}", virtual_network.display_name());
    output::print_virtual_network(&virtual_network);

    //============================================================
    // Create public IP for the gateway
    log::info!("Creating public IP address...");
    let request = PublicIpAddress::with_allocation(
        location,
        &settings.public_ip_sku,
        AllocationMethod::Static,
    );
    let public_ip = arm
        .create_public_ip(resource_group, &names.public_ip, &request)
        .await?;
    log::info!("Created public IP address {}", public_ip.display_name());

    //============================================================
    // Create VPN gateway
    log::info!("Creating virtual network gateway...");
    let request = VirtualNetworkGateway::route_based(
        location,
        &settings.vpn_gateway_sku,
        &virtual_network,
        GATEWAY_SUBNET_NAME,
        &public_ip,
    )?;
    let vpn_gateway = arm
        .create_vpn_gateway(resource_group, &names.vpn_gateway, &request)
        .await?;
    log::info!("Created virtual network gateway {}", vpn_gateway.display_name());
    output::print_vpn_gateway(&vpn_gateway);

    //============================================================
    // Create local network gateway
    log::info!("Creating local network gateway...");
    let request = LocalNetworkGateway::remote_site(
        location,
        settings.local_gateway_ip,
        settings.remote_address_space,
    );
    let local_gateway = arm
        .create_local_network_gateway(resource_group, &names.local_gateway, &request)
        .await?;
    log::info!("Created local network gateway {}", local_gateway.display_name());
    output::print_local_gateway(&local_gateway);

    //============================================================
    // Create VPN Site-to-Site connection
    log::info!("Creating virtual network gateway connection...");
    let request =
        Connection::site_to_site(location, &vpn_gateway, &local_gateway, &settings.shared_key)?;
    let connection = arm
        .create_connection(resource_group, &names.connection, &request)
        .await?;
    log::info!(
        "Created virtual network gateway connection {}",
        connection.display_name()
    );

    //============================================================
    // List connections in the resource group
    let connections = arm.list_connections(resource_group).await?;
    log::info!("Found {} connection(s)", connections.len());
    for listed in &connections {
        output::print_connection(listed);
    }
    if !connections.iter().any(|c| c.display_name() == names.connection) {
        log::warn!(
            "Connection {} is missing from the listing of {resource_group}",
            names.connection
        );
    }

    //============================================================
    // Reset virtual network gateway, not awaited
    let reset = arm
        .begin_reset_vpn_gateway(resource_group, &names.vpn_gateway)
        .await?;
    log::info!(
        "Reset of virtual network gateway {} started (HTTP {}); completion is not awaited",
        reset.resource,
        reset.status
    );

    Ok(Provisioned {
        virtual_network,
        public_ip,
        vpn_gateway,
        local_gateway,
        connection,
        connections,
        reset,
    })
}
