//! The single tracked position slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// State of the one open long position a session can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_ts: DateTime<Utc>,
    pub entry_price: f64,
    pub amount: f64,
    /// Current protective stop level. Only ever ratchets upward.
    pub stop_price: f64,
    /// Highest high observed since entry; reference for trailing rules.
    pub highest_since_entry: f64,
}

impl OpenPosition {
    /// Fold one candle into the position's running extremes.
    pub fn observe(&mut self, candle: &Candle) {
        if candle.high > self.highest_since_entry {
            self.highest_since_entry = candle.high;
        }
    }
}
