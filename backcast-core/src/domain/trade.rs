//! Trade — a round-trip open/close fill pair with PnL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a round-trip trade.
///
/// A `Long` trade is a `(Buy, Sell)` fill pair; a `Short` trade is
/// `(Sell, Buy)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Long,
    Short,
}

/// A complete round-trip trade: open fill → close fill.
///
/// `still_open` marks a position that had no matching close when the candle
/// stream ended; its close price/timestamp come from the session's last
/// observed candle, not from a real fill. The flag is the only signal —
/// never the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub action: TradeAction,
    pub open_ts: DateTime<Utc>,
    pub open_price: f64,
    pub close_ts: DateTime<Utc>,
    pub close_price: f64,
    pub amount: f64,
    pub pnl: f64,
    pub still_open: bool,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.open_price == 0.0 || self.amount == 0.0 {
            return 0.0;
        }
        self.pnl / (self.open_price * self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> Trade {
        Trade {
            action: TradeAction::Long,
            open_ts: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            open_price: 100.0,
            close_ts: Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap(),
            close_price: 110.0,
            amount: 2.0,
            pnl: 20.0,
            still_open: false,
        }
    }

    #[test]
    fn return_pct_calculation() {
        let trade = sample_trade();
        let expected = 20.0 / (100.0 * 2.0);
        assert!((trade.return_pct() - expected).abs() < 1e-10);
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade().is_winner());
        let mut loser = sample_trade();
        loser.pnl = -5.0;
        assert!(!loser.is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
