//! Rate-of-change momentum strategy.
//!
//! Opens long while momentum over the lookback window exceeds the entry
//! threshold; closes once momentum turns negative.

use crate::domain::Candle;
use crate::indicators::Roc;

use super::Strategy;

/// ROC momentum strategy.
#[derive(Debug, Clone)]
pub struct RocMomentum {
    pub period: usize,
    /// Entry threshold as a fraction (e.g., 0.05 for +5% over the window).
    pub threshold: f64,
    roc: Roc,
}

impl RocMomentum {
    pub fn new(period: usize, threshold: f64) -> Self {
        assert!(period >= 1, "period must be >= 1");
        assert!(threshold > 0.0, "threshold must be positive");
        Self {
            period,
            threshold,
            roc: Roc::new(period),
        }
    }

    pub fn default_params() -> Self {
        Self::new(20, 0.05)
    }
}

impl Strategy for RocMomentum {
    fn name(&self) -> &str {
        "roc_momentum"
    }

    fn update(&mut self, candle: &Candle) {
        if candle.close.is_nan() {
            return;
        }
        self.roc.update(candle.close);
    }

    fn should_open_long(&self) -> bool {
        self.roc.value().is_some_and(|r| r > self.threshold)
    }

    fn should_close_long(&self) -> bool {
        self.roc.value().is_some_and(|r| r < 0.0)
    }
}
