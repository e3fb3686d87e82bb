//! Per-packet evaluation pipeline
//!
//! Orchestrates the gates around the classifier:
//! primary gate -> classifier -> (if needed) secondary gate -> finalizer.
//! One synchronous pass per packet, no suspension points; a computed
//! decision is immediately final.

use crate::packet::PacketView;
use crate::policy::{Decision, DeclineReason, classify};
use crate::rate::{BudgetGates, GateVerdict, TokenBucketGates};
use crate::telemetry::PipelineStats;
use tracing::trace;

/// The host-facing admission pipeline.
///
/// Holds no per-flow state; the host owns one `G::State` per flow and
/// passes it into [`evaluate`](Pipeline::evaluate). Packets on
/// independent flows may be evaluated concurrently from separate worker
/// lanes.
#[derive(Debug)]
pub struct Pipeline<G = TokenBucketGates> {
    gates: G,
    stats: PipelineStats,
}

impl Pipeline<TokenBucketGates> {
    /// Pipeline over the built-in token bucket limiter. Per-flow budgets
    /// come from the [`RateState`](crate::rate::RateState) the host
    /// creates for each flow.
    pub fn new() -> Self {
        Self::with_gates(TokenBucketGates)
    }
}

impl Default for Pipeline<TokenBucketGates> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: BudgetGates> Pipeline<G> {
    /// Pipeline over a host-supplied rate limiter.
    pub fn with_gates(gates: G) -> Self {
        Self {
            gates,
            stats: PipelineStats::new(),
        }
    }

    /// Decision outcome counters.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Evaluate one packet against the flow's budgets and the admission
    /// policy. Returns `Forward` or `Decline`; `NeedSecondary` is
    /// resolved internally against the secondary gate.
    pub fn evaluate(&self, state: &mut G::State, pkt: &PacketView) -> Decision {
        if self.gates.primary(state, pkt.len) == GateVerdict::Throttled {
            trace!(len = pkt.len, "primary budget exhausted");
            self.stats.record_throttle();
            return Decision::Decline(DeclineReason::BudgetExceeded);
        }

        match classify(pkt) {
            Decision::Decline(reason) => {
                trace!(?reason, len = pkt.len, "packet declined");
                self.stats.record_decline();
                Decision::Decline(reason)
            }
            Decision::NeedSecondary
                if self.secondary_check(state, pkt.len) == GateVerdict::Throttled =>
            {
                trace!(len = pkt.len, "secondary budget exhausted");
                self.stats.record_throttle();
                Decision::Decline(DeclineReason::BudgetExceeded)
            }
            // Plain forward, or a secondary-class packet the gate admitted.
            // The finalizer has the last word; only count what it lets
            // through.
            _ => {
                let decision = self.gates.finalize(state);
                if decision == Decision::Forward {
                    self.stats.record_forward(pkt.len);
                }
                decision
            }
        }
    }

    fn secondary_check(&self, state: &mut G::State, bytes: u32) -> GateVerdict {
        self.stats.record_secondary_check();
        self.gates.secondary(state, bytes)
    }
}
