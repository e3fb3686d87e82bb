//! Byte-rate budget gates
//!
//! Two-tier rate limiting around the classifier: a primary budget charged
//! to every packet, and a stricter secondary budget for traffic classes
//! that carry no per-connection accounting of their own (fragments,
//! ICMP/ICMPv6). The [`BudgetGates`] trait is the seam; hosts with their
//! own rate limiter implement it, everyone else uses [`TokenBucketGates`]
//! over a per-flow [`RateState`].

use crate::config::LimitConfig;
use crate::policy::Decision;
use std::time::Instant;

/// Outcome of a budget gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Budget available; the byte count was charged.
    Forward,
    /// Budget exhausted; the packet must be dropped or throttled.
    Throttled,
}

/// Refill-on-demand token bucket denominated in bytes.
#[derive(Debug)]
pub struct TokenBucket {
    tokens: f64,
    /// Refill rate in bytes per second.
    rate: f64,
    /// Burst capacity in bytes.
    capacity: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket that starts full.
    pub fn new(rate_bytes_per_sec: f64, burst_bytes: f64) -> Self {
        Self {
            tokens: burst_bytes,
            rate: rate_bytes_per_sec,
            capacity: burst_bytes,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0001 {
            self.tokens = (self.tokens + self.rate * elapsed).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Charge `bytes` against the bucket. Returns false without charging
    /// if the balance is insufficient.
    pub fn consume(&mut self, bytes: u32) -> bool {
        self.refill();
        let cost = f64::from(bytes);
        if self.tokens >= cost {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }

    /// Current balance in bytes, without refilling.
    pub fn balance(&self) -> f64 {
        self.tokens
    }
}

/// Per-flow budget state: the two token buckets plus forwarded-byte
/// bookkeeping. Owned by the host, one per flow; only the gate calls
/// mutate it.
#[derive(Debug)]
pub struct RateState {
    primary: TokenBucket,
    secondary: TokenBucket,
    /// Bytes charged by the primary gate but not yet settled by finalize.
    pending: u32,
    forwarded_bytes: u64,
}

impl RateState {
    pub fn new(limits: &LimitConfig) -> Self {
        Self {
            primary: TokenBucket::new(limits.primary_rate as f64, limits.primary_burst as f64),
            secondary: TokenBucket::new(
                limits.secondary_rate as f64,
                limits.secondary_burst as f64,
            ),
            pending: 0,
            forwarded_bytes: 0,
        }
    }

    /// Total bytes forwarded on this flow so far.
    pub fn forwarded_bytes(&self) -> u64 {
        self.forwarded_bytes
    }
}

/// The two budget gates and the finalizer, as the pipeline consumes them.
///
/// `State` is the per-flow handle the host owns and passes by reference;
/// the pipeline never looks inside it.
pub trait BudgetGates {
    type State;

    /// First-pass byte budget, charged to every packet before
    /// classification.
    fn primary(&self, state: &mut Self::State, bytes: u32) -> GateVerdict;

    /// Stricter budget for fragmented TCP and admitted ICMP/ICMPv6,
    /// tracked separately from the primary one.
    fn secondary(&self, state: &mut Self::State, bytes: u32) -> GateVerdict;

    /// Settle bookkeeping for a packet every applicable gate admitted.
    /// Its result is the pipeline's overall decision.
    fn finalize(&self, state: &mut Self::State) -> Decision;
}

/// Default gate implementation over [`RateState`] token buckets.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenBucketGates;

impl BudgetGates for TokenBucketGates {
    type State = RateState;

    fn primary(&self, state: &mut RateState, bytes: u32) -> GateVerdict {
        if state.primary.consume(bytes) {
            state.pending = bytes;
            GateVerdict::Forward
        } else {
            GateVerdict::Throttled
        }
    }

    fn secondary(&self, state: &mut RateState, bytes: u32) -> GateVerdict {
        if state.secondary.consume(bytes) {
            GateVerdict::Forward
        } else {
            GateVerdict::Throttled
        }
    }

    fn finalize(&self, state: &mut RateState) -> Decision {
        state.forwarded_bytes += u64::from(state.pending);
        state.pending = 0;
        Decision::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low refill rates so the buckets stay effectively drained for the
    // duration of a test.
    fn test_limits() -> LimitConfig {
        LimitConfig {
            primary_rate: 10,
            primary_burst: 1000,
            secondary_rate: 10,
            secondary_burst: 100,
        }
    }

    #[test]
    fn test_bucket_starts_full() {
        let mut bucket = TokenBucket::new(10.0, 500.0);
        assert_eq!(bucket.balance(), 500.0);
        assert!(bucket.consume(500));
    }

    #[test]
    fn test_bucket_rejects_beyond_burst() {
        let mut bucket = TokenBucket::new(10.0, 500.0);
        assert!(!bucket.consume(501));
        // A failed consume charges nothing.
        assert_eq!(bucket.balance(), 500.0);
        assert!(bucket.consume(500));
    }

    #[test]
    fn test_bucket_drains() {
        let mut bucket = TokenBucket::new(10.0, 300.0);
        assert!(bucket.consume(200));
        assert!(!bucket.consume(200));
        assert!(bucket.consume(100));
    }

    #[test]
    fn test_gates_charge_separate_buckets() {
        let gates = TokenBucketGates;
        let mut state = RateState::new(&test_limits());

        // Drain the secondary budget; the primary is untouched.
        assert_eq!(gates.secondary(&mut state, 100), GateVerdict::Forward);
        assert_eq!(gates.secondary(&mut state, 100), GateVerdict::Throttled);
        assert_eq!(gates.primary(&mut state, 1000), GateVerdict::Forward);
    }

    #[test]
    fn test_finalize_settles_forwarded_bytes() {
        let gates = TokenBucketGates;
        let mut state = RateState::new(&test_limits());

        assert_eq!(gates.primary(&mut state, 400), GateVerdict::Forward);
        assert_eq!(gates.finalize(&mut state), Decision::Forward);
        assert_eq!(state.forwarded_bytes(), 400);

        assert_eq!(gates.primary(&mut state, 300), GateVerdict::Forward);
        assert_eq!(gates.finalize(&mut state), Decision::Forward);
        assert_eq!(state.forwarded_bytes(), 700);
    }

    #[test]
    fn test_primary_throttles_when_drained() {
        let gates = TokenBucketGates;
        let mut state = RateState::new(&test_limits());

        assert_eq!(gates.primary(&mut state, 1000), GateVerdict::Forward);
        assert_eq!(gates.primary(&mut state, 1000), GateVerdict::Throttled);
    }
}
