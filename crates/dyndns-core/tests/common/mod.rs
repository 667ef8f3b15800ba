//! Test doubles and common utilities for the reconciliation contract tests
//!
//! The mocks here are handle-style: cloning one shares its counters and
//! recorded calls, so a test can box a clone into the engine and keep a
//! handle for assertions.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use dyndns_core::addr::IpAddress;
use dyndns_core::config::{ReconcilerConfig, RecordTarget, RecordsConfig};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{IpResolver, IpStore, RecordUpdater, UpsertOutcome};
use dyndns_core::ReconcileEngine;

/// A resolver that returns a fixed IP, or fails on demand
#[derive(Clone)]
pub struct MockResolver {
    ip: IpAddress,
    fail: Arc<AtomicBool>,
    call_count: Arc<AtomicUsize>,
}

impl MockResolver {
    pub fn returning(ip: &str) -> Self {
        Self {
            ip: ip.parse().expect("valid test IP"),
            fail: Arc::new(AtomicBool::new(false)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        let resolver = Self::returning("0.0.0.0");
        resolver.fail.store(true, Ordering::SeqCst);
        resolver
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for MockResolver {
    async fn lookup(&self) -> Result<IpAddress> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(Error::resolver("simulated detection outage"))
        } else {
            Ok(self.ip.clone())
        }
    }
}

/// An updater that records every invocation and fails for chosen fqdns
#[derive(Clone)]
pub struct MockUpdater {
    /// Fully-qualified names whose upsert should fail
    failing_fqdns: Arc<Mutex<HashSet<String>>>,
    /// Recorded `(fqdn, ip)` invocations, in call order
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockUpdater {
    pub fn new() -> Self {
        Self {
            failing_fqdns: Arc::new(Mutex::new(HashSet::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fail_for(self, fqdn: &str) -> Self {
        self.failing_fqdns.lock().unwrap().insert(fqdn.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Recorded invocations as `(fqdn, ip)` pairs, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordUpdater for MockUpdater {
    async fn upsert(&self, target: &RecordTarget, ip: &IpAddress) -> Result<UpsertOutcome> {
        let fqdn = target.fqdn();
        self.calls
            .lock()
            .unwrap()
            .push((fqdn.clone(), ip.to_string()));

        if self.failing_fqdns.lock().unwrap().contains(&fqdn) {
            Err(Error::provider(format!("simulated API failure for {}", fqdn)))
        } else {
            Ok(UpsertOutcome::Edited { record_id: None })
        }
    }
}

/// A store with injectable read/write failures
#[derive(Clone)]
pub struct MockStore {
    value: Arc<Mutex<Option<IpAddress>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_count: Arc<AtomicUsize>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            value: Arc::new(Mutex::new(None)),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            write_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_ip(ip: &str) -> Self {
        let store = Self::empty();
        *store.value.lock().unwrap() = Some(ip.parse().expect("valid test IP"));
        store
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn value(&self) -> Option<IpAddress> {
        self.value.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpStore for MockStore {
    async fn load(&self) -> Result<Option<IpAddress>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(Error::store("simulated read failure"))
        } else {
            Ok(self.value.lock().unwrap().clone())
        }
    }

    async fn store(&self, ip: &IpAddress) -> Result<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(Error::store("simulated write failure"))
        } else {
            *self.value.lock().unwrap() = Some(ip.clone());
            Ok(())
        }
    }
}

/// Build an engine over mock collaborators with a short poll interval.
pub fn engine_with(
    resolver: &MockResolver,
    updater: &MockUpdater,
    store: &MockStore,
    records: RecordsConfig,
) -> ReconcileEngine {
    let config = ReconcilerConfig::new(records).with_poll_interval_secs(1);
    ReconcileEngine::new(
        Box::new(resolver.clone()),
        Box::new(updater.clone()),
        Box::new(store.clone()),
        config,
    )
    .expect("engine construction succeeds")
}

/// Records config used by most tests: apex plus `www` on one domain.
pub fn apex_and_www(domain: &str) -> RecordsConfig {
    RecordsConfig::DomainWithSubdomains {
        domain: domain.to_string(),
        subdomains: vec!["".to_string(), "www".to_string()],
    }
}
