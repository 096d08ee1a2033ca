//! Random resource names, so repeated runs do not collide.

use crate::error::{Error, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Length of generated network resource names.
pub const NAME_LENGTH: usize = 20;
const RESOURCE_GROUP_PREFIX: &str = "NetworkSampleRG";
const RESOURCE_GROUP_SUFFIX_LEN: usize = 6;

/// Resource group: 1-90 word chars, hyphens, periods or parentheses, no trailing period.
static RESOURCE_GROUP_REGEX: OnceLock<Regex> = OnceLock::new();
/// Network resources: 1-80 chars, start alphanumeric, end alphanumeric or underscore.
static NETWORK_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn resource_group_regex() -> &'static Regex {
    RESOURCE_GROUP_REGEX
        .get_or_init(|| Regex::new(r"^[-\w.()]{0,89}[-\w()]$").expect("Invalid Regex"))
}

fn network_name_regex() -> &'static Regex {
    NETWORK_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([-\w.]{0,78}[A-Za-z0-9_])?$").expect("Invalid Regex")
    })
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// `prefix` padded with random lowercase alphanumerics to `max_len` characters.
///
/// At least three random characters are always appended; an over-long prefix
/// is shortened to make room.
pub fn random_resource_name(prefix: &str, max_len: usize) -> String {
    let suffix_len = max_len.saturating_sub(prefix.len()).max(3);
    let keep = max_len.saturating_sub(suffix_len);
    let prefix: String = prefix.to_lowercase().chars().take(keep).collect();
    format!("{prefix}{}", random_suffix(suffix_len))
}

/// `prefix` followed by a short random suffix.
pub fn create_random_name(prefix: &str) -> String {
    format!("{prefix}{}", random_suffix(RESOURCE_GROUP_SUFFIX_LEN))
}

pub fn validate_resource_group_name(name: &str) -> Result<()> {
    if resource_group_regex().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
            reason: "resource group names are 1-90 letters, digits, '_', '-', '.', '(' or ')' and may not end in '.'".to_string(),
        })
    }
}

pub fn validate_network_resource_name(name: &str) -> Result<()> {
    if network_name_regex().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
            reason: "network resource names are 1-80 letters, digits, '_', '-' or '.', starting alphanumeric and ending alphanumeric or '_'".to_string(),
        })
    }
}

/// Names of every resource one run creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleNames {
    pub resource_group: String,
    pub virtual_network: String,
    pub public_ip: String,
    pub vpn_gateway: String,
    pub local_gateway: String,
    pub connection: String,
}

impl SampleNames {
    /// Fresh random names for one run.
    pub fn random() -> Self {
        SampleNames {
            resource_group: create_random_name(RESOURCE_GROUP_PREFIX),
            virtual_network: random_resource_name("vnet", NAME_LENGTH),
            public_ip: random_resource_name("pip", NAME_LENGTH),
            vpn_gateway: random_resource_name("vngw", NAME_LENGTH),
            local_gateway: random_resource_name("lngw", NAME_LENGTH),
            connection: random_resource_name("con", NAME_LENGTH),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_resource_group_name(&self.resource_group)?;
        for name in [
            &self.virtual_network,
            &self.public_ip,
            &self.vpn_gateway,
            &self.local_gateway,
            &self.connection,
        ] {
            validate_network_resource_name(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_resource_name_length_and_prefix() {
        let name = random_resource_name("vngw", 20);
        assert_eq!(name.len(), 20);
        assert!(name.starts_with("vngw"));
        assert!(name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_random_resource_name_long_prefix() {
        let name = random_resource_name("averyveryverylongprefix", 10);
        assert_eq!(name.len(), 10);
        assert!(name.starts_with("averyve"));
    }

    #[test]
    fn test_create_random_name() {
        let name = create_random_name("NetworkSampleRG");
        assert!(name.starts_with("NetworkSampleRG"));
        assert_eq!(name.len(), "NetworkSampleRG".len() + 6);
    }

    #[test]
    fn test_sample_names_are_valid_and_distinct() {
        let a = SampleNames::random();
        let b = SampleNames::random();
        a.validate().unwrap();
        b.validate().unwrap();
        assert_ne!(a, b);
        assert_ne!(a.resource_group, b.resource_group);
    }

    #[test]
    fn test_resource_group_name_rules() {
        assert!(validate_resource_group_name("NetworkSampleRG(1)-x_y.z").is_ok());
        assert!(validate_resource_group_name("ends.with.period.").is_err());
        assert!(validate_resource_group_name("").is_err());
        assert!(validate_resource_group_name("has space").is_err());
        assert!(validate_resource_group_name(&"a".repeat(91)).is_err());
    }

    #[test]
    fn test_network_name_rules() {
        assert!(validate_network_resource_name("vnet1234").is_ok());
        assert!(validate_network_resource_name("v").is_ok());
        assert!(validate_network_resource_name("-vnet").is_err());
        assert!(validate_network_resource_name("vnet.").is_err());
        assert!(validate_network_resource_name(&"a".repeat(81)).is_err());
    }
}
