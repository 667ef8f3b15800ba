// # dyndns-core
//
// Core library for the dyndns polling agent.
//
// ## Architecture Overview
//
// This library provides the change-detection and reconciliation core for
// keeping DNS A records pointed at a host's current public IP:
//
// - **IpResolver**: trait for detecting the current public IP
// - **RecordUpdater**: trait for idempotent create-or-update of one A record
// - **IpStore**: trait for the durable last-applied-IP value
// - **ReconcileEngine**: orchestrates detect → compare → update → commit,
//   with a built-in non-overlapping interval scheduler
//
// ## Design Principles
//
// 1. **Explicit collaborators**: the engine owns all decisions; resolvers,
//    updaters and stores are pass-through I/O behind traits
// 2. **Aggregate commit**: the new IP is persisted only when every record
//    update in a cycle succeeded
// 3. **Idempotency**: an unchanged IP makes zero provider calls, and
//    re-applying after partial failure is safe
// 4. **Library-first**: the daemon is a thin shell over this crate

pub mod addr;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use addr::IpAddress;
pub use config::{ReconcilerConfig, RecordTarget, RecordsConfig};
pub use engine::{CycleOutcome, ReconcileEngine};
pub use error::{Error, Result};
pub use state::{FileIpStore, MemoryIpStore};
pub use traits::{IpResolver, IpStore, RecordUpdater, UpsertOutcome};
