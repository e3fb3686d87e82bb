//! Metrics collection for pipeline outcomes.
//!
//! Thread-safe counters the host can scrape; drops are only observable
//! here and in the host's own accounting, since declined packets are
//! dropped silently.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds a value to the counter.
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Gets the current value of the counter.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Decision outcome counters for one pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Packets forwarded.
    pub forwarded: Counter,
    /// Bytes forwarded.
    pub forwarded_bytes: Counter,
    /// Packets declined by the classifier.
    pub declined: Counter,
    /// Packets refused by a budget gate.
    pub throttled: Counter,
    /// Packets routed through the secondary budget gate.
    pub secondary_checks: Counter,
}

impl PipelineStats {
    /// Creates new pipeline statistics initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a forwarded packet.
    pub fn record_forward(&self, bytes: u32) {
        self.forwarded.inc();
        self.forwarded_bytes.add(u64::from(bytes));
    }

    /// Records a classifier decline.
    pub fn record_decline(&self) {
        self.declined.inc();
    }

    /// Records a budget-gate refusal.
    pub fn record_throttle(&self) {
        self.throttled.inc();
    }

    /// Records a secondary-gate consultation.
    pub fn record_secondary_check(&self) {
        self.secondary_checks.inc();
    }
}
