//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] for the address spaces and subnet prefixes sent to ARM,
//! along with the few subnet calculations the sample needs for validation
//! and printing.

use crate::error::{Error, Result};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use azure_vpn_site2site::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        Err(Error::config("Network length is too long"))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(len)?;
    let network_bits = u32::from(addr) & mask;
    Ok(Ipv4Addr::from(network_bits | !mask))
}

/// Calculate the number of usable host addresses in an Azure subnet.
///
/// Azure reserves 5 IP addresses per subnet (network, broadcast, gateway, and 2 DNS).
pub fn num_az_hosts(len: u8) -> Result<u64> {
    if len >= MAX_LENGTH - 2 {
        // /29 = 8 IPs, 3 usable
        Err(Error::config("Network length is too long or invalid"))
    } else {
        Ok((1u64 << (MAX_LENGTH - len)) - 5)
    }
}

/// IPv4 address with CIDR notation support.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR '{s}': {e}")))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| Error::config(format!("Invalid address/mask {addr_cidr}")))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| Error::config(format!("Invalid address {addr}")))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| Error::config(format!("Invalid mask {mask}")))?;
        if mask > MAX_LENGTH {
            return Err(Error::config("Network length is too long"));
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Get the lowest (network) address in the subnet.
    pub fn lo(&self) -> Ipv4Addr {
        cut_addr(self.addr, self.mask.min(MAX_LENGTH)).unwrap_or(self.addr)
    }

    /// Get the highest (broadcast) address in the subnet.
    pub fn hi(&self) -> Ipv4Addr {
        broadcast_addr(self.addr, self.mask.min(MAX_LENGTH)).unwrap_or(self.addr)
    }

    /// True when `other` lies entirely inside this network.
    pub fn contains(&self, other: &Ipv4) -> bool {
        self.mask <= other.mask && self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    /// True when the two networks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }

    /// True when the address is the network address for its mask.
    pub fn is_network_address(&self) -> bool {
        self.lo() == self.addr
    }
}

impl FromStr for Ipv4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
