// # Persisted-IP Store Implementations
//
// This module provides implementations of the IpStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileIpStore;
pub use memory::MemoryIpStore;
