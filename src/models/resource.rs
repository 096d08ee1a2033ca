//! Generic ARM resource envelope and identifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fully qualified ARM resource ID,
/// e.g. `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{name}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment: the resource's own name.
    pub fn name(&self) -> Option<&str> {
        self.0.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Value following the `resourceGroups` segment (matched case-insensitively).
    pub fn resource_group(&self) -> Option<&str> {
        self.segment_value("resourceGroups")
    }

    /// ID of a nested resource, e.g. a subnet below a virtual network.
    pub fn child(&self, kind: &str, name: &str) -> ResourceId {
        ResourceId(format!("{}/{kind}/{name}", self.0.trim_end_matches('/')))
    }

    fn segment_value(&self, key: &str) -> Option<&str> {
        let mut segments = self.0.split('/').filter(|s| !s.is_empty());
        while let Some(segment) = segments.next() {
            if segment.eq_ignore_ascii_case(key) {
                return segments.next();
            }
        }
        None
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to another resource by ID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubResource {
    pub id: ResourceId,
}

impl From<ResourceId> for SubResource {
    fn from(id: ResourceId) -> Self {
        SubResource { id }
    }
}

/// `provisioningState` reported by ARM.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Succeeded,
    Creating,
    Updating,
    Deleting,
    Failed,
    Canceled,
    #[serde(other)]
    Other,
}

impl ProvisioningState {
    /// No further change expected without a new request.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProvisioningState::Succeeded | ProvisioningState::Failed | ProvisioningState::Canceled
        )
    }
}

/// SKU block used on the resource envelope (e.g. public IPs).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Sku {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// ARM resource envelope shared by every tracked resource.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Resource<P> {
    /// Assigned by ARM; absent in request bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub properties: P,
}

impl<P> Resource<P> {
    /// Request body for a new resource in `location`.
    pub fn new(location: &str, properties: P) -> Self {
        Resource {
            id: None,
            name: None,
            kind: None,
            location: Some(location.to_string()),
            tags: BTreeMap::new(),
            sku: None,
            etag: None,
            properties,
        }
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.sku = Some(sku);
        self
    }

    pub fn with_tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }

    /// ID returned by ARM, required before the resource can be referenced.
    pub fn require_id(&self) -> crate::Result<&ResourceId> {
        self.id.as_ref().ok_or_else(|| {
            crate::Error::missing_reference(format!(
                "resource '{}' has no id",
                self.display_name()
            ))
        })
    }

    /// Name for log lines, falling back to the ID's last segment.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.id.as_ref().and_then(|id| id.name()))
            .unwrap_or("<unnamed>")
    }
}

/// Page of a list response.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VNET_ID: &str = "/subscriptions/0000-1111/resourceGroups/NetworkSampleRGab12cd/providers/Microsoft.Network/virtualNetworks/vnetabcdefghijklmnop";

    #[test]
    fn test_resource_id_segments() {
        let id = ResourceId::new(VNET_ID);
        assert_eq!(id.name(), Some("vnetabcdefghijklmnop"));
        assert_eq!(id.resource_group(), Some("NetworkSampleRGab12cd"));
    }

    #[test]
    fn test_resource_id_case_insensitive_group() {
        let id = ResourceId::new("/subscriptions/s1/resourcegroups/rg1");
        assert_eq!(id.resource_group(), Some("rg1"));
        assert_eq!(id.name(), Some("rg1"));
    }

    #[test]
    fn test_resource_id_child() {
        let id = ResourceId::new(VNET_ID);
        let subnet = id.child("subnets", "GatewaySubnet");
        assert_eq!(subnet.as_str(), format!("{VNET_ID}/subnets/GatewaySubnet"));
        assert_eq!(subnet.name(), Some("GatewaySubnet"));
    }

    #[test]
    fn test_provisioning_state_unknown_value() {
        let state: ProvisioningState = serde_json::from_str("\"Migrating\"").unwrap();
        assert_eq!(state, ProvisioningState::Other);
        assert!(!state.is_terminal());
        assert!(ProvisioningState::Succeeded.is_terminal());
        assert!(ProvisioningState::Failed.is_terminal());
        assert!(!ProvisioningState::Updating.is_terminal());
    }

    #[test]
    fn test_request_body_omits_server_fields() {
        let body = Resource::new("eastus", serde_json::json!({}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"location": "eastus", "properties": {}}));
    }

    #[test]
    fn test_require_id() {
        let body = Resource::new("eastus", ());
        assert!(matches!(
            body.require_id(),
            Err(crate::Error::MissingReference(_))
        ));
    }
}
