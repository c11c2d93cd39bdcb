//! Fill and the append-only order log.
//!
//! The order log is the session's single source of truth for what executed.
//! Appends enforce the two invariants the reporter depends on: timestamps
//! never go backwards, and fill sides strictly alternate (every log is a
//! valid sequence of round-trip opens and closes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side of a simulated market-order execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// One simulated market-order execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub amount: f64,
    pub side: Side,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LogError {
    #[error("fill at {timestamp} repeats side {side:?} of the previous fill")]
    SequencingViolation {
        timestamp: DateTime<Utc>,
        side: Side,
    },

    #[error("fill at {next} precedes the previous fill at {prev}")]
    NonMonotonicTimestamp {
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}

/// Append-only, time-ordered sequence of fills for one session.
///
/// A rejected append indicates a session sequencing bug and is fatal to the
/// run; the log itself is left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLog {
    fills: Vec<Fill>,
}

impl OrderLog {
    pub fn new() -> Self {
        Self { fills: Vec::new() }
    }

    /// Append a fill, enforcing side alternation and timestamp order.
    pub fn append(&mut self, fill: Fill) -> Result<(), LogError> {
        if let Some(last) = self.fills.last() {
            if fill.timestamp < last.timestamp {
                return Err(LogError::NonMonotonicTimestamp {
                    prev: last.timestamp,
                    next: fill.timestamp,
                });
            }
            if fill.side == last.side {
                return Err(LogError::SequencingViolation {
                    timestamp: fill.timestamp,
                    side: fill.side,
                });
            }
        }
        self.fills.push(fill);
        Ok(())
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn last(&self) -> Option<&Fill> {
        self.fills.last()
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}
