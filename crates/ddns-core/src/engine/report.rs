//! Per-cycle aggregation of reconciliation results

use crate::error::Error;
use crate::reconcile::ReconcileOutcome;
use std::net::Ipv6Addr;
use std::time::Duration;

/// Result of reconciling one configured domain
#[derive(Debug)]
pub struct DomainResult {
    /// The domain, as configured
    pub domain: String,
    /// What happened to it
    pub result: Result<ReconcileOutcome, Error>,
}

/// Overall classification of a completed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Every domain reconciled
    AllSucceeded,
    /// Some but not all domains failed
    PartiallySucceeded {
        succeeded: usize,
        total: usize,
    },
    /// Every domain failed
    AllFailed,
}

impl CycleStatus {
    /// Anything other than full success backs off with the error interval
    pub fn is_success(&self) -> bool {
        matches!(self, CycleStatus::AllSucceeded)
    }
}

/// Everything a cycle that got past address resolution produced
#[derive(Debug)]
pub struct CycleReport {
    /// Address all domains were reconciled against
    pub address: Ipv6Addr,
    /// One entry per configured domain, in configuration order
    pub domains: Vec<DomainResult>,
}

impl CycleReport {
    /// Start an empty report for `address`
    pub fn new(address: Ipv6Addr) -> Self {
        Self {
            address,
            domains: Vec::new(),
        }
    }

    /// Record the result for the next domain
    pub fn push(&mut self, domain: impl Into<String>, result: Result<ReconcileOutcome, Error>) {
        self.domains.push(DomainResult {
            domain: domain.into(),
            result,
        });
    }

    /// Number of domains reconciled
    pub fn total(&self) -> usize {
        self.domains.len()
    }

    /// Number of domains that did not fail
    pub fn successes(&self) -> usize {
        self.domains.iter().filter(|d| d.result.is_ok()).count()
    }

    /// Every failing domain with its error
    pub fn failures(&self) -> Vec<(&str, &Error)> {
        self.domains
            .iter()
            .filter_map(|d| match &d.result {
                Err(e) => Some((d.domain.as_str(), e)),
                Ok(_) => None,
            })
            .collect()
    }

    /// Classify the cycle by its success count
    pub fn status(&self) -> CycleStatus {
        let succeeded = self.successes();
        let total = self.total();

        if succeeded == total {
            CycleStatus::AllSucceeded
        } else if succeeded == 0 {
            CycleStatus::AllFailed
        } else {
            CycleStatus::PartiallySucceeded { succeeded, total }
        }
    }
}

/// Outcome of one iteration of the driver loop
#[derive(Debug)]
pub enum CycleOutcome {
    /// The address could not be resolved; no domain was touched
    LookupFailed(Error),
    /// Every configured domain was reconciled
    Completed(CycleReport),
}

impl CycleOutcome {
    /// True only when the address resolved and every domain succeeded
    pub fn is_success(&self) -> bool {
        match self {
            CycleOutcome::LookupFailed(_) => false,
            CycleOutcome::Completed(report) => report.status().is_success(),
        }
    }

    /// The per-domain report, unless the lookup failed
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(report) => Some(report),
            CycleOutcome::LookupFailed(_) => None,
        }
    }
}

/// The two wait states of the driver loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Wait after a fully successful cycle
    Success(Duration),
    /// Wait after a lookup failure or any domain failure
    Error(Duration),
}

impl WaitState {
    /// How long to sleep before the next cycle
    pub fn duration(&self) -> Duration {
        match self {
            WaitState::Success(d) | WaitState::Error(d) => *d,
        }
    }
}
