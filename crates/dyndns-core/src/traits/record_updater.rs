// # Record Updater Trait
//
// Defines the interface for pushing one DNS A record to the provider.
//
// ## Implementations
//
// - Generic JSON-API provider: `dyndns-provider-http` crate
//
// ## Responsibility boundary
//
// Updaters execute a single create-or-update per invocation and report
// success or failure. Aggregation across targets, the decision to update at
// all, and persistence of the applied IP are owned by the engine. Updaters
// must not retry, cache, or touch the state store.

use async_trait::async_trait;

use crate::addr::IpAddress;
use crate::config::RecordTarget;

/// Result of a successful create-or-update operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// An existing record was edited in place
    Edited {
        /// Provider-assigned record id, when the API reports one
        record_id: Option<String>,
    },
    /// No record matched, so one was created
    Created {
        /// Provider-assigned record id, when the API reports one
        record_id: Option<String>,
    },
}

/// Trait for DNS record updater implementations
///
/// # Idempotency
///
/// `upsert` must be idempotent: re-applying an IP a record already carries
/// is a success. The engine relies on this when it retries every target
/// after a partial failure, including targets that already succeeded.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Create or update the A record for `target`, pointing it at `ip`.
    ///
    /// Implementations locate an existing record by type `A` and the
    /// target's fully-qualified name, edit it in place when found, and
    /// create it otherwise. Success means the provider's response carried
    /// an explicit success status; anything else is an error.
    ///
    /// # Parameters
    ///
    /// - `target`: the record to maintain
    /// - `ip`: the address to apply
    async fn upsert(
        &self,
        target: &RecordTarget,
        ip: &IpAddress,
    ) -> Result<UpsertOutcome, crate::Error>;
}
