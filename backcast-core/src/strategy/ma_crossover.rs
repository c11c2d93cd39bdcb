//! Moving average crossover strategy — golden cross entry.
//!
//! Opens long when the fast MA crosses above the slow MA (golden cross).
//! Closes while the fast MA sits below the slow MA. The close condition is
//! level-based rather than cross-based so a position is still closed if the
//! down-cross happens on a candle the open predicate never saw.

use crate::domain::Candle;
use crate::indicators::{MaType, MovingAverage};

use super::Strategy;

/// Moving average crossover strategy.
///
/// Holds a fast/slow moving average pair, fed once per candle with the
/// close price. Both averages must be warm and a previous reading must
/// exist before either predicate can fire.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub fast_period: usize,
    pub slow_period: usize,
    fast: MovingAverage,
    slow: MovingAverage,
    prev: Option<(f64, f64)>,
    cur: Option<(f64, f64)>,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize, ma_type: MaType) -> Self {
        assert!(fast_period >= 1, "fast_period must be >= 1");
        assert!(
            slow_period > fast_period,
            "slow_period must be > fast_period"
        );
        Self {
            fast_period,
            slow_period,
            fast: MovingAverage::new(ma_type, fast_period),
            slow: MovingAverage::new(ma_type, slow_period),
            prev: None,
            cur: None,
        }
    }

    pub fn default_params() -> Self {
        Self::new(10, 50, MaType::Sma)
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn update(&mut self, candle: &Candle) {
        if candle.close.is_nan() {
            return;
        }
        self.fast.update(candle.close);
        self.slow.update(candle.close);
        self.prev = self.cur;
        self.cur = match (self.fast.value(), self.slow.value()) {
            (Some(fast), Some(slow)) => Some((fast, slow)),
            _ => None,
        };
    }

    fn should_open_long(&self) -> bool {
        // Golden cross: fast above slow now, at or below it on the previous
        // candle.
        match (self.prev, self.cur) {
            (Some((fast_prev, slow_prev)), Some((fast_cur, slow_cur))) => {
                fast_cur > slow_cur && fast_prev <= slow_prev
            }
            _ => false,
        }
    }

    fn should_close_long(&self) -> bool {
        match self.cur {
            Some((fast_cur, slow_cur)) => fast_cur < slow_cur,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_candle(index: usize, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
                + chrono::Duration::days(index as i64),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 2000.0,
        }
    }

    fn feed(strategy: &mut MaCrossover, closes: &[f64]) {
        for (i, &close) in closes.iter().enumerate() {
            strategy.update(&make_candle(i, close));
        }
    }

    #[test]
    fn fires_long_on_golden_cross() {
        let mut sig = MaCrossover::new(2, 4, MaType::Sma);
        // Declining closes keep fast <= slow; the jump flips the order.
        feed(&mut sig, &[100.0, 98.0, 96.0, 94.0, 92.0]);
        assert!(!sig.should_open_long());
        sig.update(&make_candle(5, 120.0));
        assert!(sig.should_open_long(), "expected golden cross");
    }

    #[test]
    fn close_predicate_tracks_fast_below_slow() {
        let mut sig = MaCrossover::new(2, 4, MaType::Sma);
        feed(&mut sig, &[100.0, 102.0, 104.0, 106.0, 108.0]);
        assert!(!sig.should_close_long());
        // Sharp decline drags the fast average below the slow one.
        feed(&mut sig, &[90.0, 80.0]);
        assert!(sig.should_close_long());
    }

    #[test]
    fn no_fire_when_trend_continues() {
        let mut sig = MaCrossover::new(2, 4, MaType::Sma);
        feed(&mut sig, &[100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0]);
        // Fast has been above slow for several candles — no new cross.
        assert!(!sig.should_open_long());
        assert!(!sig.should_close_long());
    }

    #[test]
    fn warmup_guard_no_fire_before_slow_period() {
        let mut sig = MaCrossover::new(2, 4, MaType::Sma);
        feed(&mut sig, &[100.0, 101.0, 102.0]);
        assert!(!sig.should_open_long());
        assert!(!sig.should_close_long());
    }

    #[test]
    fn nan_close_is_skipped() {
        let mut sig = MaCrossover::new(2, 4, MaType::Sma);
        feed(&mut sig, &[100.0, 98.0, 96.0, 94.0, 92.0]);
        let mut void = make_candle(5, 120.0);
        void.close = f64::NAN;
        sig.update(&void);
        assert!(!sig.should_open_long());
    }

    #[test]
    fn ema_variant_crosses() {
        let mut sig = MaCrossover::new(2, 4, MaType::Ema);
        feed(&mut sig, &[100.0, 98.0, 96.0, 94.0, 92.0]);
        sig.update(&make_candle(5, 140.0));
        assert!(sig.should_open_long());
    }

    #[test]
    #[should_panic(expected = "slow_period must be > fast_period")]
    fn rejects_slow_leq_fast() {
        MaCrossover::new(50, 10, MaType::Sma);
    }

    #[test]
    fn name_and_params() {
        let sig = MaCrossover::default_params();
        assert_eq!(sig.name(), "ma_crossover");
        assert_eq!(sig.fast_period, 10);
        assert_eq!(sig.slow_period, 50);
    }
}
