// # IP Store Trait
//
// Defines the interface for the durable single-value store holding the last
// IP address that was successfully applied to every configured record.
//
// ## Contract
//
// - Absence means no fully successful reconciliation has ever completed.
// - Presence means every configured record was confirmed updated to this
//   value at the time of the last write.
// - The engine writes at most once per cycle, and only on aggregate success.
//
// ## Implementations
//
// - File-backed with atomic replacement: [`crate::state::FileIpStore`]
// - In-memory (tests, embedders): [`crate::state::MemoryIpStore`]

use async_trait::async_trait;

use crate::addr::IpAddress;

/// Trait for persisted-IP store implementations
///
/// # Thread safety
///
/// Cycles are serialized by the scheduler, so implementations need no
/// locking beyond whatever makes a single write atomic.
#[async_trait]
pub trait IpStore: Send + Sync {
    /// Read the last fully-applied IP.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ip))`: a previous cycle committed this address
    /// - `Ok(None)`: first run, or the store has never been written
    /// - `Err(Error)`: the read failed; the engine degrades this to `None`
    async fn load(&self) -> Result<Option<IpAddress>, crate::Error>;

    /// Durably replace the stored value with `ip`.
    ///
    /// The replacement must be atomic: a reader never observes a partial
    /// write. Failures must be reported, never swallowed; the engine will
    /// not claim the IP as applied if this returns an error.
    async fn store(&self, ip: &IpAddress) -> Result<(), crate::Error>;
}
