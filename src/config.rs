//! Run configuration: credentials and provisioning settings.
//!
//! Everything is read from the process environment (a `.env` file is
//! loaded by `main`). Settings have the sample's defaults and a few
//! optional overrides.

use crate::error::{Error, Result};
use crate::models::{Ipv4, GATEWAY_SUBNET_NAME};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const DEFAULT_LOCATION: &str = "eastus";
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SHARED_KEY: &str = "MySecretKey";
/// Delay between long-running operation polls when ARM sends no `Retry-After`.
pub const POLL_INTERVAL_SECS: u64 = 10;

pub const VNET_ADDRESS_SPACE: Ipv4 = Ipv4 {
    addr: Ipv4Addr::new(10, 11, 0, 0),
    mask: 16,
};
pub const GATEWAY_SUBNET_PREFIX: Ipv4 = Ipv4 {
    addr: Ipv4Addr::new(10, 11, 255, 0),
    mask: 27,
};
pub const LOCAL_GATEWAY_IP: Ipv4Addr = Ipv4Addr::new(40, 71, 184, 214);
pub const REMOTE_ADDRESS_SPACE: Ipv4 = Ipv4 {
    addr: Ipv4Addr::new(192, 168, 3, 0),
    mask: 24,
};
pub const PUBLIC_IP_SKU: &str = "Standard";
pub const VPN_GATEWAY_SKU: &str = "VpnGw1";

/// Smallest gateway subnet Azure accepts.
const MIN_GATEWAY_SUBNET_MASK: u8 = 29;

/// Service principal credentials.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub subscription_id: String,
}

impl Credentials {
    /// Read `CLIENT_ID`, `CLIENT_SECRET`, `TENANT_ID` and `SUBSCRIPTION_ID`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(Error::MissingEnv(key))
        };
        Ok(Credentials {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            tenant_id: required("TENANT_ID")?,
            subscription_id: required("SUBSCRIPTION_ID")?,
        })
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

/// What gets provisioned and where.
#[derive(Clone)]
pub struct Settings {
    pub location: String,
    pub arm_endpoint: String,
    pub authority_host: String,
    pub vnet_address_space: Ipv4,
    pub gateway_subnet: Ipv4,
    pub public_ip_sku: String,
    pub vpn_gateway_sku: String,
    pub local_gateway_ip: Ipv4Addr,
    pub remote_address_space: Ipv4,
    pub shared_key: String,
    pub poll_interval: Duration,
}

impl Settings {
    /// Defaults with `AZURE_LOCATION`, `ARM_ENDPOINT`, `AZURE_AUTHORITY_HOST`,
    /// `VPN_SHARED_KEY` and `ARM_POLL_INTERVAL_SECS` applied.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(location) = optional("AZURE_LOCATION") {
            // Display names such as "East US" map to the region name "eastus".
            settings.location = location
                .split_whitespace()
                .collect::<String>()
                .to_lowercase();
        }
        if let Some(endpoint) = optional("ARM_ENDPOINT") {
            settings.arm_endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(host) = optional("AZURE_AUTHORITY_HOST") {
            settings.authority_host = host.trim().trim_end_matches('/').to_string();
        }
        if let Some(key) = optional("VPN_SHARED_KEY") {
            settings.shared_key = key;
        }
        if let Some(secs) = optional("ARM_POLL_INTERVAL_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::config(format!("ARM_POLL_INTERVAL_SECS is not a number: {secs}"))
            })?;
            settings.poll_interval = Duration::from_secs(secs);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings ARM would refuse, before anything is created.
    pub fn validate(&self) -> Result<()> {
        if self.location.is_empty() {
            return Err(Error::config("location must not be empty"));
        }
        if !self.location.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::config(format!(
                "location must be a region name such as eastus: {}",
                self.location
            )));
        }
        if !self.arm_endpoint.starts_with("http") {
            return Err(Error::config(format!(
                "ARM endpoint must be an http(s) url: {}",
                self.arm_endpoint
            )));
        }
        if !self.vnet_address_space.is_network_address() {
            return Err(Error::config(format!(
                "virtual network address space {} is not a network address",
                self.vnet_address_space
            )));
        }
        if !self.gateway_subnet.is_network_address() {
            return Err(Error::config(format!(
                "{GATEWAY_SUBNET_NAME} {} is not a network address",
                self.gateway_subnet
            )));
        }
        if !self.vnet_address_space.contains(&self.gateway_subnet) {
            return Err(Error::config(format!(
                "{GATEWAY_SUBNET_NAME} {} is outside the virtual network {}",
                self.gateway_subnet, self.vnet_address_space
            )));
        }
        if self.gateway_subnet.mask > MIN_GATEWAY_SUBNET_MASK {
            return Err(Error::config(format!(
                "{GATEWAY_SUBNET_NAME} {} is smaller than /{MIN_GATEWAY_SUBNET_MASK}",
                self.gateway_subnet
            )));
        }
        if self.vnet_address_space.overlaps(&self.remote_address_space) {
            return Err(Error::config(format!(
                "remote address space {} overlaps the virtual network {}",
                self.remote_address_space, self.vnet_address_space
            )));
        }
        if self.shared_key.is_empty() {
            return Err(Error::config("shared key must not be empty"));
        }
        Ok(())
    }

    /// OAuth scope for the ARM endpoint.
    pub fn arm_scope(&self) -> String {
        format!("{}/.default", self.arm_endpoint)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            location: DEFAULT_LOCATION.to_string(),
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            vnet_address_space: VNET_ADDRESS_SPACE,
            gateway_subnet: GATEWAY_SUBNET_PREFIX,
            public_ip_sku: PUBLIC_IP_SKU.to_string(),
            vpn_gateway_sku: VPN_GATEWAY_SKU.to_string(),
            local_gateway_ip: LOCAL_GATEWAY_IP,
            remote_address_space: REMOTE_ADDRESS_SPACE,
            shared_key: DEFAULT_SHARED_KEY.to_string(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("location", &self.location)
            .field("arm_endpoint", &self.arm_endpoint)
            .field("vnet_address_space", &self.vnet_address_space)
            .field("gateway_subnet", &self.gateway_subnet)
            .field("vpn_gateway_sku", &self.vpn_gateway_sku)
            .field("local_gateway_ip", &self.local_gateway_ip)
            .field("remote_address_space", &self.remote_address_space)
            .field("shared_key", &"***")
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[
            ("CLIENT_ID", "app"),
            ("CLIENT_SECRET", "s3cret"),
            ("TENANT_ID", "tenant"),
            ("SUBSCRIPTION_ID", " sub "),
        ]))
        .unwrap();
        assert_eq!(creds.subscription_id, "sub");
        assert!(!format!("{creds:?}").contains("s3cret"));
    }

    #[test]
    fn test_credentials_missing_variable() {
        let err = Credentials::from_lookup(lookup(&[
            ("CLIENT_ID", "app"),
            ("CLIENT_SECRET", "s3cret"),
            ("SUBSCRIPTION_ID", "sub"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::MissingEnv("TENANT_ID")));

        let err = Credentials::from_lookup(lookup(&[("CLIENT_ID", "  ")])).unwrap_err();
        assert!(matches!(err, Error::MissingEnv("CLIENT_ID")));
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.location, "eastus");
        assert_eq!(settings.gateway_subnet.to_string(), "10.11.255.0/27");
        assert_eq!(settings.arm_scope(), "https://management.azure.com/.default");
        assert!(!format!("{settings:?}").contains("MySecretKey"));
    }

    #[test]
    fn test_settings_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("AZURE_LOCATION", "WestEurope"),
            ("ARM_ENDPOINT", "http://127.0.0.1:1234/"),
            ("VPN_SHARED_KEY", "other-key"),
            ("ARM_POLL_INTERVAL_SECS", "2"),
        ]))
        .unwrap();
        assert_eq!(settings.location, "westeurope");
        assert_eq!(settings.arm_endpoint, "http://127.0.0.1:1234");
        assert_eq!(settings.shared_key, "other-key");
        assert_eq!(settings.poll_interval, Duration::from_secs(2));

        let err = Settings::from_lookup(lookup(&[("ARM_POLL_INTERVAL_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_location_display_name_is_normalised() {
        let display_name = lookup(&[("AZURE_LOCATION", " East US 2 ")]);
        let settings = Settings::from_lookup(display_name).unwrap();
        assert_eq!(settings.location, "eastus2");

        let hyphenated = lookup(&[("AZURE_LOCATION", "east-us")]);
        let err = Settings::from_lookup(hyphenated).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("region name")));
    }

    #[test]
    fn test_validate_gateway_subnet_outside_vnet() {
        let settings = Settings {
            gateway_subnet: Ipv4::new("10.12.255.0/27").unwrap(),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("outside the virtual network"));
    }

    #[test]
    fn test_validate_gateway_subnet_too_small() {
        let settings = Settings {
            gateway_subnet: Ipv4::new("10.11.255.0/30").unwrap(),
            ..Settings::default()
        };
        assert!(settings.validate().unwrap_err().to_string().contains("smaller than /29"));
    }

    #[test]
    fn test_validate_remote_overlap() {
        let settings = Settings {
            remote_address_space: Ipv4::new("10.11.3.0/24").unwrap(),
            ..Settings::default()
        };
        assert!(settings.validate().unwrap_err().to_string().contains("overlaps"));
    }

    #[test]
    fn test_validate_empty_shared_key() {
        let settings = Settings {
            shared_key: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
