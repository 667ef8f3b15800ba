//! Core traits for the dyndns agent
//!
//! This module defines the abstract interfaces the reconciliation engine
//! depends on.
//!
//! - [`IpResolver`]: answer "what is the current public IP"
//! - [`RecordUpdater`]: create-or-update one DNS A record at the provider
//! - [`IpStore`]: durable single-value store for the last applied IP

pub mod ip_resolver;
pub mod ip_store;
pub mod record_updater;

pub use ip_resolver::IpResolver;
pub use ip_store::IpStore;
pub use record_updater::{RecordUpdater, UpsertOutcome};
