// # Memory IP Store
//
// In-memory implementation of IpStore.
//
// ## Purpose
//
// A store that does not survive restarts. The first cycle after a restart
// sees "absent" and re-applies the current IP, which is harmless because
// upserts are idempotent.
//
// ## When to Use
//
// - Tests
// - Container deployments where a redundant first update is acceptable

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::addr::IpAddress;
use crate::traits::ip_store::IpStore;

/// In-memory persisted-IP store
#[derive(Debug, Clone, Default)]
pub struct MemoryIpStore {
    inner: Arc<RwLock<Option<IpAddress>>>,
}

impl MemoryIpStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a previously-applied IP.
    pub fn with_ip(ip: IpAddress) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(ip))),
        }
    }
}

#[async_trait]
impl IpStore for MemoryIpStore {
    async fn load(&self) -> Result<Option<IpAddress>, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn store(&self, ip: &IpAddress) -> Result<(), Error> {
        *self.inner.write().await = Some(ip.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryIpStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        let ip: IpAddress = "1.2.3.4".parse().unwrap();
        store.store(&ip).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(ip));
    }

    #[tokio::test]
    async fn test_memory_store_seeded() {
        let ip: IpAddress = "9.9.9.9".parse().unwrap();
        let store = MemoryIpStore::with_ip(ip.clone());
        assert_eq!(store.load().await.unwrap(), Some(ip));
    }
}
