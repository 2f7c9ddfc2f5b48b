//! Core DDNS engine
//!
//! The DdnsEngine is the driver loop. Each cycle it:
//! - Resolves the current address via AddressSource
//! - Reconciles every configured domain against the RecordStore
//! - Aggregates the per-domain results
//! - Waits for the success or the error interval
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ AddressSource │─── Ipv6Addr ───┐
//! └───────────────┘                │
//!                                  ▼
//!                         ┌──────────────┐
//!                         │ DdnsEngine   │
//!                         └──────────────┘
//!                                  │
//!                  ┌───────────────┴───────────────┐
//!                  │                               │
//!                  ▼                               ▼
//!          ┌──────────────┐                ┌─────────────┐
//!          │ reconcile()  │──► RecordStore │   Events    │
//!          │ (per domain) │                │  (notify)   │
//!          └──────────────┘                └─────────────┘
//! ```
//!
//! ## State Machine
//!
//! After every cycle the engine is in exactly one of two states,
//! `Waiting(success)` or `Waiting(error)`. A failed address lookup, or any
//! failed domain, selects the error interval.
//!
//! Domains are processed one at a time in configuration order. A hung
//! provider call stalls the whole cycle.

mod report;

pub use report::{CycleOutcome, CycleReport, CycleStatus, DomainResult, WaitState};

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::reconcile::{ReconcileOutcome, reconcile};
use crate::traits::{AddressSource, RecordStore};
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Capacity of the engine event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { domains_count: usize },

    /// Address resolved at the start of a cycle
    AddressResolved { address: Ipv6Addr },

    /// Address could not be resolved; the cycle is abandoned
    AddressLookupFailed { error: String },

    /// Record already matched; nothing written
    RecordUnchanged { domain: String, address: Ipv6Addr },

    /// Record created
    RecordCreated { domain: String, address: Ipv6Addr },

    /// Record updated
    RecordUpdated {
        domain: String,
        address: Ipv6Addr,
        previous: String,
    },

    /// Reconciliation failed for one domain
    RecordFailed { domain: String, error: String },

    /// All domains processed
    CycleCompleted { status: CycleStatus },

    /// Loop is about to sleep
    Waiting { state: WaitState },

    /// Engine stopped
    Stopped { reason: String },
}

/// Core DDNS engine
///
/// Holds an immutable configuration snapshot and the two injected
/// collaborators. Nothing else is shared between cycles.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Engine runs until the process is terminated
pub struct DdnsEngine {
    /// Source of the current address
    address_source: Box<dyn AddressSource>,

    /// Remote record store
    store: Box<dyn RecordStore>,

    /// Configuration snapshot
    config: DdnsConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        address_source: Box<dyn AddressSource>,
        store: Box<dyn RecordStore>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            address_source,
            store,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The configuration snapshot the engine runs with
    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Run the engine
    ///
    /// Loops forever; errors inside a cycle are logged and never end the loop.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// The signal is honoured while the engine waits between cycles; a cycle
    /// in progress always completes first.
    ///
    /// **TESTING ONLY**: production code should use `run()` and let the
    /// process be terminated.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, mut shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        info!(
            "Starting update loop for {} domain(s) on interface {}",
            self.config.cloudflare.domains.len(),
            self.config.network.interface
        );
        self.emit_event(EngineEvent::Started {
            domains_count: self.config.cloudflare.domains.len(),
        });

        loop {
            let outcome = self.run_cycle().await;
            let state = self.wait_state(&outcome);

            debug!("Next cycle in {}s", state.duration().as_secs());
            self.emit_event(EngineEvent::Waiting { state });

            match shutdown_rx.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = tokio::time::sleep(state.duration()) => {}
                        _ = rx => {
                            info!("Shutdown signal received");
                            self.emit_event(EngineEvent::Stopped {
                                reason: "Shutdown signal".to_string(),
                            });
                            return Ok(());
                        }
                    }
                }
                None => tokio::time::sleep(state.duration()).await,
            }
        }
    }

    /// Run a single cycle: resolve once, then reconcile every domain in order
    pub async fn run_cycle(&self) -> CycleOutcome {
        let interface = &self.config.network.interface;

        let address = match self.address_source.resolve(interface).await {
            Ok(address) => address,
            Err(e) => {
                error!("Error getting IPv6 address for {}: {}", interface, e);
                self.emit_event(EngineEvent::AddressLookupFailed {
                    error: e.to_string(),
                });
                return CycleOutcome::LookupFailed(e);
            }
        };

        debug!(
            "Resolved {} on {} via {}",
            address,
            interface,
            self.address_source.source_name()
        );
        self.emit_event(EngineEvent::AddressResolved { address });

        let zone = &self.config.cloudflare.zone_id;
        let mut report = CycleReport::new(address);

        for domain in &self.config.cloudflare.domains {
            let result = reconcile(self.store.as_ref(), zone, domain, address).await;
            self.emit_domain_event(domain, address, &result);
            report.push(domain.clone(), result);
        }

        let status = report.status();
        match status {
            CycleStatus::AllSucceeded => {
                info!("Successfully updated all domains with IPv6 address: {}", address);
            }
            CycleStatus::PartiallySucceeded { succeeded, total } => {
                warn!(
                    "Partially successful: updated {} out of {} domains",
                    succeeded, total
                );
            }
            CycleStatus::AllFailed => {
                error!("Failed to update all {} domains", report.total());
            }
        }

        if !status.is_success() {
            let summary = report
                .failures()
                .iter()
                .map(|(domain, e)| format!("{}: {}", domain, e))
                .collect::<Vec<_>>()
                .join("; ");
            error!("Error updating domains: {}", summary);
        }

        self.emit_event(EngineEvent::CycleCompleted { status });
        CycleOutcome::Completed(report)
    }

    /// Select the wait state that follows `outcome`
    pub fn wait_state(&self, outcome: &CycleOutcome) -> WaitState {
        if outcome.is_success() {
            WaitState::Success(self.config.interval.success_duration())
        } else {
            WaitState::Error(self.config.interval.error_duration())
        }
    }

    /// Interval slept after a successful cycle
    pub fn success_interval(&self) -> Duration {
        self.config.interval.success_duration()
    }

    /// Interval slept after a failed cycle
    pub fn error_interval(&self) -> Duration {
        self.config.interval.error_duration()
    }

    fn emit_domain_event(
        &self,
        domain: &str,
        address: Ipv6Addr,
        result: &Result<ReconcileOutcome>,
    ) {
        let event = match result {
            Ok(ReconcileOutcome::Unchanged) => EngineEvent::RecordUnchanged {
                domain: domain.to_string(),
                address,
            },
            Ok(ReconcileOutcome::Created) => {
                info!("Created record {} -> {}", domain, address);
                EngineEvent::RecordCreated {
                    domain: domain.to_string(),
                    address,
                }
            }
            Ok(ReconcileOutcome::Updated { previous }) => {
                info!("Updated {} -> {} (previous: {})", domain, address, previous);
                EngineEvent::RecordUpdated {
                    domain: domain.to_string(),
                    address,
                    previous: previous.clone(),
                }
            }
            Err(e) => {
                error!("Failed to update domain {}: {}", domain, e);
                EngineEvent::RecordFailed {
                    domain: domain.to_string(),
                    error: e.to_string(),
                }
            }
        };
        self.emit_event(event);
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Dropped rather than awaited so a slow consumer never stalls the loop
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event");
        }
    }
}
