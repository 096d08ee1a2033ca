//! VPN gateway, local network gateway and gateway connection models.

use super::network::{AddressSpace, AllocationMethod, PublicIpAddress, VirtualNetwork};
use super::resource::{ProvisioningState, Resource, SubResource};
use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayType {
    #[default]
    Vpn,
    ExpressRoute,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VpnType {
    #[default]
    RouteBased,
    PolicyBased,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GatewaySku {
    pub name: String,
    pub tier: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GatewayIpConfigurationProperties {
    #[serde(rename = "privateIPAllocationMethod")]
    pub private_ip_allocation_method: AllocationMethod,
    pub subnet: Option<SubResource>,
    #[serde(rename = "publicIPAddress")]
    pub public_ip_address: Option<SubResource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GatewayIpConfiguration {
    pub name: String,
    #[serde(default)]
    pub properties: GatewayIpConfigurationProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkGatewayProperties {
    pub gateway_type: GatewayType,
    pub vpn_type: VpnType,
    pub sku: GatewaySku,
    #[serde(default)]
    pub enable_bgp: bool,
    #[serde(default)]
    pub active_active: bool,
    #[serde(default)]
    pub ip_configurations: Vec<GatewayIpConfiguration>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

pub type VirtualNetworkGateway = Resource<VirtualNetworkGatewayProperties>;

impl VirtualNetworkGateway {
    /// Route-based VPN gateway placed in the network's gateway subnet.
    ///
    /// Both references are read from the already-created resources.
    pub fn route_based(
        location: &str,
        sku: &str,
        network: &VirtualNetwork,
        gateway_subnet: &str,
        public_ip: &PublicIpAddress,
    ) -> crate::Result<Self> {
        let subnet_id = network.subnet_id(gateway_subnet)?;
        let public_ip_id = public_ip.require_id()?.clone();
        Ok(Resource::new(
            location,
            VirtualNetworkGatewayProperties {
                gateway_type: GatewayType::Vpn,
                vpn_type: VpnType::RouteBased,
                sku: GatewaySku {
                    name: sku.to_string(),
                    tier: sku.to_string(),
                },
                enable_bgp: false,
                active_active: false,
                ip_configurations: vec![GatewayIpConfiguration {
                    name: "vnetGatewayConfig".to_string(),
                    properties: GatewayIpConfigurationProperties {
                        private_ip_allocation_method: AllocationMethod::Dynamic,
                        subnet: Some(subnet_id.into()),
                        public_ip_address: Some(public_ip_id.into()),
                    },
                }],
                provisioning_state: None,
            },
        ))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalNetworkGatewayProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_ip_address: Option<Ipv4Addr>,
    #[serde(default)]
    pub local_network_address_space: AddressSpace,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

pub type LocalNetworkGateway = Resource<LocalNetworkGatewayProperties>;

impl LocalNetworkGateway {
    /// Cloud-side stand-in for the on-premises VPN device.
    pub fn remote_site(location: &str, gateway_ip: Ipv4Addr, address_space: Ipv4) -> Self {
        Resource::new(
            location,
            LocalNetworkGatewayProperties {
                gateway_ip_address: Some(gateway_ip),
                local_network_address_space: AddressSpace::new(&[address_space]),
                provisioning_state: None,
            },
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionType {
    #[default]
    IPsec,
    Vnet2Vnet,
    ExpressRoute,
    VPNClient,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperties {
    pub connection_type: ConnectionType,
    pub virtual_network_gateway1: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_network_gateway2: Option<SubResource>,
    /// Pre-shared key; ARM does not echo it back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_weight: Option<u32>,
    #[serde(default, skip_serializing)]
    pub connection_status: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

pub type Connection = Resource<ConnectionProperties>;

impl Connection {
    /// IPsec site-to-site connection linking the two gateways.
    pub fn site_to_site(
        location: &str,
        vpn_gateway: &VirtualNetworkGateway,
        local_gateway: &LocalNetworkGateway,
        shared_key: &str,
    ) -> crate::Result<Self> {
        Ok(Resource::new(
            location,
            ConnectionProperties {
                connection_type: ConnectionType::IPsec,
                virtual_network_gateway1: Some(vpn_gateway.require_id()?.clone().into()),
                local_network_gateway2: Some(local_gateway.require_id()?.clone().into()),
                shared_key: Some(shared_key.to_string()),
                routing_weight: Some(10),
                connection_status: None,
                provisioning_state: None,
            },
        ))
    }
}
