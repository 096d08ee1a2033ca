//! Resource group, virtual network and public IP models.

use super::resource::{ProvisioningState, Resource, ResourceId, Sku};
use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Name Azure requires for the subnet hosting a VPN gateway.
pub const GATEWAY_SUBNET_NAME: &str = "GatewaySubnet";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

pub type ResourceGroup = Resource<ResourceGroupProperties>;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    #[serde(default)]
    pub address_prefixes: Vec<Ipv4>,
}

impl AddressSpace {
    pub fn new(prefixes: &[Ipv4]) -> Self {
        AddressSpace {
            address_prefixes: prefixes.to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<Ipv4>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

/// Subnet nested in a virtual network.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    pub name: String,
    #[serde(default)]
    pub properties: SubnetProperties,
}

impl Subnet {
    pub fn new(name: &str, prefix: Ipv4) -> Self {
        Subnet {
            id: None,
            name: name.to_string(),
            properties: SubnetProperties {
                address_prefix: Some(prefix),
                provisioning_state: None,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    pub address_space: AddressSpace,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

pub type VirtualNetwork = Resource<VirtualNetworkProperties>;

impl VirtualNetwork {
    /// Network with one address space and a single gateway subnet.
    pub fn with_gateway_subnet(location: &str, address_space: Ipv4, gateway_subnet: Ipv4) -> Self {
        Resource::new(
            location,
            VirtualNetworkProperties {
                address_space: AddressSpace::new(&[address_space]),
                subnets: vec![Subnet::new(GATEWAY_SUBNET_NAME, gateway_subnet)],
                provisioning_state: None,
            },
        )
    }

    /// ID of the named subnet as returned by ARM.
    ///
    /// Falls back to deriving it from the network ID when ARM left the
    /// nested subnet without one.
    pub fn subnet_id(&self, name: &str) -> crate::Result<ResourceId> {
        let subnet = self
            .properties
            .subnets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                crate::Error::missing_reference(format!(
                    "virtual network '{}' has no subnet named {name}",
                    self.display_name()
                ))
            })?;
        match &subnet.id {
            Some(id) => Ok(id.clone()),
            None => Ok(self.require_id()?.child("subnets", &subnet.name)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationMethod {
    #[default]
    Static,
    Dynamic,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    #[serde(rename = "publicIPAllocationMethod")]
    pub allocation_method: AllocationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Ipv4Addr>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

pub type PublicIpAddress = Resource<PublicIpAddressProperties>;

impl PublicIpAddress {
    pub fn with_allocation(location: &str, sku: &str, allocation_method: AllocationMethod) -> Self {
        Resource::new(
            location,
            PublicIpAddressProperties {
                allocation_method,
                ip_address: None,
                provisioning_state: None,
            },
        )
        .with_sku(Sku {
            name: sku.to_string(),
            tier: None,
        })
    }
}
