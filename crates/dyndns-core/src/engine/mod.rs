//! Reconciliation engine
//!
//! The ReconcileEngine is responsible for:
//! - Resolving the current public IP via IpResolver
//! - Comparing it against the last applied IP in the IpStore
//! - Driving per-record updates via RecordUpdater
//! - Committing the new IP only when every record update succeeded
//!
//! ## Cycle Flow
//!
//! ```text
//! ┌──────────────┐      ┌──────────────────┐      ┌───────────────┐
//! │  IpResolver  │──────▶  ReconcileEngine │──────▶ RecordUpdater │
//! └──────────────┘      └──────────────────┘      │ (per target)  │
//!                                │                └───────────────┘
//!                                ▼
//!                         ┌────────────┐
//!                         │  IpStore   │  written only on aggregate success
//!                         └────────────┘
//! ```
//!
//! ## Partial failure
//!
//! When any target fails, the new IP is deliberately *not* persisted. The
//! next cycle re-detects the same change and re-applies every target,
//! including the ones that already succeeded. Upserts are idempotent, so
//! the repeat application is safe; success is tracked only in aggregate.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::addr::IpAddress;
use crate::config::{ReconcilerConfig, RecordTarget};
use crate::error::Result;
use crate::traits::{IpResolver, IpStore, RecordUpdater};

/// Outcome of one reconciliation cycle
///
/// The scheduler treats cycles as fire-and-forget; the outcome exists so
/// that embedders and tests can observe what the engine decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The public IP could not be determined; nothing was attempted
    ResolveFailed,

    /// The resolved IP matches the last applied IP; no provider calls made
    Unchanged {
        /// The (unchanged) current IP
        ip: IpAddress,
    },

    /// Every target was updated and the new IP was durably recorded
    Applied {
        /// The newly applied IP
        ip: IpAddress,
    },

    /// One or more targets failed; the new IP was withheld from the store
    PartialFailure {
        /// The IP that could not be fully applied
        ip: IpAddress,
        /// Fully-qualified names of the targets that failed
        failed: Vec<String>,
    },

    /// All targets succeeded but the store write failed; the IP is live at
    /// the provider yet will be re-detected as changed next cycle
    CommitFailed {
        /// The IP that was applied but not recorded
        ip: IpAddress,
    },
}

/// Reconciliation engine
///
/// Stateless between invocations except for the durable value it reads from
/// and writes to the [`IpStore`]. Collaborators are boxed trait objects so
/// tests and embedders can substitute their own.
///
/// ## Lifecycle
///
/// 1. Create with [`ReconcileEngine::new()`]
/// 2. Either drive it yourself with [`ReconcileEngine::run_cycle()`], or
///    hand it to the built-in scheduler with [`ReconcileEngine::run()`]
pub struct ReconcileEngine {
    /// Public-IP resolver
    resolver: Box<dyn IpResolver>,

    /// DNS record updater
    updater: Box<dyn RecordUpdater>,

    /// Durable last-applied-IP store
    store: Box<dyn IpStore>,

    /// Concrete ordered record targets, resolved once at construction
    targets: Vec<RecordTarget>,

    /// Interval between scheduled cycles
    poll_interval: Duration,
}

impl ReconcileEngine {
    /// Create a new engine.
    ///
    /// Record targets are resolved from the configuration here, once;
    /// resolution is pure, so the target list is fixed for the process
    /// lifetime.
    pub fn new(
        resolver: Box<dyn IpResolver>,
        updater: Box<dyn RecordUpdater>,
        store: Box<dyn IpStore>,
        config: ReconcilerConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver,
            updater,
            store,
            targets: config.records.targets(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        })
    }

    /// The concrete record targets this engine maintains.
    pub fn targets(&self) -> &[RecordTarget] {
        &self.targets
    }

    /// Run one reconciliation cycle: detect, compare, update, commit.
    pub async fn run_cycle(&self) -> CycleOutcome {
        info!("starting DNS update check");

        let current = match self.resolver.lookup().await {
            Ok(ip) => ip,
            Err(e) => {
                error!("failed to determine current IP address: {}", e);
                return CycleOutcome::ResolveFailed;
            }
        };
        info!("detected public IP: {}", current);

        // A failed read is treated as "no prior value": worst case we
        // re-apply an IP the records already carry, which is idempotent.
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                error!("failed to read stored IP, assuming first run: {}", e);
                None
            }
        };

        if stored.as_ref() == Some(&current) {
            info!("IP address unchanged, no update needed");
            return CycleOutcome::Unchanged { ip: current };
        }

        match &stored {
            Some(previous) => info!("IP change detected: {} -> {}", previous, current),
            None => info!("IP change detected: None -> {}", current),
        }

        // Best-effort fan-out: one target failing never aborts its siblings.
        let mut failed = Vec::new();
        for target in &self.targets {
            let name = target.fqdn();
            match self.updater.upsert(target, &current).await {
                Ok(outcome) => {
                    info!("DNS record updated: {} -> {} ({:?})", name, current, outcome);
                }
                Err(e) => {
                    error!("failed to update DNS record {}: {}", name, e);
                    failed.push(name);
                }
            }
        }

        if !failed.is_empty() {
            warn!(
                "{} of {} DNS updates failed, will retry all on next check",
                failed.len(),
                self.targets.len()
            );
            return CycleOutcome::PartialFailure {
                ip: current,
                failed,
            };
        }

        // Aggregate success: record the IP as durably applied. A failed
        // write must not masquerade as success, or a restart would skip
        // records that were never confirmed.
        match self.store.store(&current).await {
            Ok(()) => {
                info!("all DNS records updated successfully, stored new IP: {}", current);
                CycleOutcome::Applied { ip: current }
            }
            Err(e) => {
                error!("all DNS records updated but storing the IP failed: {}", e);
                CycleOutcome::CommitFailed { ip: current }
            }
        }
    }

    /// Run the scheduling loop until SIGINT/SIGTERM.
    ///
    /// Performs one cycle immediately, then one per configured interval.
    /// Cycles never overlap: the loop awaits each cycle before the next
    /// tick is considered, and a tick that fires while a cycle is still
    /// running is skipped.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        info!(
            "scheduler started: {} record(s), checking every {:?}",
            self.targets.len(),
            self.poll_interval
        );

        // The first tick completes immediately, giving the startup cycle.
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for the provided shutdown signal
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Runs to completion before shutdown is observed, so
                        // an in-flight cycle is never aborted mid-update.
                        let _ = self.run_cycle().await;
                    }
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT/SIGTERM
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _ = self.run_cycle().await;
                    }
                    _ = shutdown_signal() => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        }

        info!("scheduler stopped");
        Ok(())
    }

    /// Test-only helper to run the scheduler with a controlled shutdown
    /// signal.
    ///
    /// Production code should use [`ReconcileEngine::run()`], which manages
    /// shutdown via OS signals rather than programmatic channels.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}

/// Resolve when either SIGINT or SIGTERM arrives.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to install SIGTERM handler: {}", e);
            // Fall back to ctrl-c only
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
