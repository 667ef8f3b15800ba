//! Opaque IP address value
//!
//! The agent treats IP addresses as opaque, comparable strings. The only
//! check performed at construction is non-emptiness; a malformed dotted-quad
//! travels all the way to the DNS provider, whose rejection surfaces as an
//! ordinary update failure. Change detection is byte-equal string comparison,
//! so whatever the detection service hands back is exactly what gets compared
//! and persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An opaque IPv4 address string, as reported by the detection service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpAddress(String);

impl IpAddress {
    /// Wrap a detected address. Fails only on empty/whitespace input.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_input("IP address cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IpAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims_values() {
        let ip = IpAddress::new(" 10.0.0.1\n").unwrap();
        assert_eq!(ip.as_str(), "10.0.0.1");
        assert_eq!(ip.to_string(), "10.0.0.1");
    }

    #[test]
    fn rejects_empty_values() {
        assert!(IpAddress::new("").is_err());
        assert!(IpAddress::new("   \n").is_err());
    }

    #[test]
    fn malformed_values_pass_through() {
        // Validation is the provider's job, not ours.
        let ip = IpAddress::new("not-an-ip").unwrap();
        assert_eq!(ip.as_str(), "not-an-ip");
    }

    #[test]
    fn comparison_is_byte_equal() {
        let a: IpAddress = "10.0.0.1".parse().unwrap();
        let b: IpAddress = "10.0.0.1".parse().unwrap();
        let c: IpAddress = "10.0.0.2".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serde_roundtrip_is_transparent() {
        let ip: IpAddress = "203.0.113.7".parse().unwrap();
        let json = serde_json::to_string(&ip).unwrap();
        assert_eq!(json, "\"203.0.113.7\"");
        let back: IpAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ip);
    }
}
