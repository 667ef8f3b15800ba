// # IP Resolver Trait
//
// Defines the interface for detecting the host's current public IP.
//
// ## Implementations
//
// - HTTP detection service: `dyndns-ip-http` crate
// - Future: router UPnP/IGD queries, interface inspection
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::IpResolver;
//
// let resolver = /* IpResolver implementation */;
// let ip = resolver.lookup().await?;
// println!("current public IP: {ip}");
// ```

use async_trait::async_trait;

use crate::addr::IpAddress;

/// Trait for public-IP resolver implementations
///
/// A resolver performs one authenticated read against an external detection
/// service and reports the address it sees. Resolvers make no decisions:
/// whether the address constitutes a change is owned by the engine.
///
/// # Failure semantics
///
/// Any transport error, timeout, or missing/malformed address field is an
/// error. The engine treats a failed lookup as "skip this cycle" and retries
/// on the next one; resolvers must not retry internally.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Look up the current public IP address.
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddress)`: the detected (non-empty) address
    /// - `Err(Error)`: the lookup failed; nothing may be inferred
    async fn lookup(&self) -> Result<IpAddress, crate::Error>;
}
