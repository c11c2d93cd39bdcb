//! Stop policies — where the protective stop starts and when it moves.
//!
//! Policies emit desired stop levels; the session decides whether a move is
//! warranted and drives the stop machine. Stops obey the ratchet invariant:
//! they may tighten but never loosen, enforced at the session, so a policy
//! returning a lower level is simply ignored.

use crate::domain::Candle;

use super::position::OpenPosition;

/// Trait for stop policies.
pub trait StopPolicy: Send + Sync {
    /// Human-readable name (e.g., "fixed_percent", "breakeven_then_trail").
    fn name(&self) -> &str;

    /// Initial protective stop level for a fresh entry.
    fn initial_stop(&self, entry_price: f64) -> f64;

    /// Desired stop level for an open position, or `None` to hold.
    fn desired_stop(&self, position: &OpenPosition, candle: &Candle) -> Option<f64>;
}

/// Fixed-percent stop below entry; never moves.
#[derive(Debug, Clone)]
pub struct FixedPercentStop {
    /// Stop distance below entry (e.g., 0.05 for 5%).
    pub pct: f64,
}

impl FixedPercentStop {
    pub fn new(pct: f64) -> Self {
        assert!(pct > 0.0, "pct must be positive");
        assert!(pct < 1.0, "pct must be < 1.0");
        Self { pct }
    }
}

impl StopPolicy for FixedPercentStop {
    fn name(&self) -> &str {
        "fixed_percent"
    }

    fn initial_stop(&self, entry_price: f64) -> f64 {
        entry_price * (1.0 - self.pct)
    }

    fn desired_stop(&self, _position: &OpenPosition, _candle: &Candle) -> Option<f64> {
        None
    }
}

/// Two-phase stop: move to breakeven once profit reaches the trigger, then
/// trail below the highest high since entry.
///
/// Phase detection uses the current stop level: once the stop sits at or
/// above entry, breakeven has been reached and the policy trails.
#[derive(Debug, Clone)]
pub struct BreakevenThenTrail {
    /// Initial stop distance below entry (e.g., 0.05 for 5%).
    pub initial_pct: f64,
    /// Profit threshold that triggers the move to breakeven.
    pub breakeven_trigger_pct: f64,
    /// Trail distance below the highest high after breakeven.
    pub trail_pct: f64,
}

impl BreakevenThenTrail {
    pub fn new(initial_pct: f64, breakeven_trigger_pct: f64, trail_pct: f64) -> Self {
        assert!(initial_pct > 0.0, "initial_pct must be positive");
        assert!(initial_pct < 1.0, "initial_pct must be < 1.0");
        assert!(
            breakeven_trigger_pct > 0.0,
            "breakeven_trigger_pct must be positive"
        );
        assert!(trail_pct > 0.0, "trail_pct must be positive");
        assert!(trail_pct < 1.0, "trail_pct must be < 1.0");
        Self {
            initial_pct,
            breakeven_trigger_pct,
            trail_pct,
        }
    }
}

impl StopPolicy for BreakevenThenTrail {
    fn name(&self) -> &str {
        "breakeven_then_trail"
    }

    fn initial_stop(&self, entry_price: f64) -> f64 {
        entry_price * (1.0 - self.initial_pct)
    }

    fn desired_stop(&self, position: &OpenPosition, _candle: &Candle) -> Option<f64> {
        let entry = position.entry_price;
        let breakeven_reached = position.stop_price >= entry - 1e-10;

        if breakeven_reached {
            // Phase 2: trail below the highest high since entry.
            Some(position.highest_since_entry * (1.0 - self.trail_pct))
        } else {
            // Phase 1: wait for the breakeven trigger.
            let profit_pct = (position.highest_since_entry - entry) / entry;
            if profit_pct >= self.breakeven_trigger_pct {
                Some(entry)
            } else {
                None
            }
        }
    }
}
