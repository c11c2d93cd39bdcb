//! Data layer — candle sources and stream-boundary validation.
//!
//! The session assumes a well-formed, time-ordered candle stream. Everything
//! that could violate that assumption (malformed rows, insane OHLC,
//! non-monotonic timestamps) is rejected here, before a candle ever reaches
//! the session.

pub mod ingest;
pub mod synthetic;

pub use ingest::{load_candles_csv, read_candles_csv, write_candles_csv};
pub use synthetic::synthetic_candles;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Candle;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("candle at {timestamp} fails OHLC sanity check")]
    InsaneCandle { timestamp: DateTime<Utc> },

    #[error("candle at {next} does not advance the stream (previous candle at {prev})")]
    NonMonotonic {
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}

/// A finite, lazily-produced, non-restartable candle sequence.
///
/// `None` is the explicit completion signal; after it, the source is
/// exhausted for good (restart by constructing a new source). Consumed
/// synchronously, one candle at a time.
pub trait CandleSource {
    fn next_candle(&mut self) -> Option<Candle>;
}

/// In-memory candle source over a pre-validated vector.
pub struct VecSource {
    candles: std::vec::IntoIter<Candle>,
}

impl VecSource {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles: candles.into_iter(),
        }
    }
}

impl CandleSource for VecSource {
    fn next_candle(&mut self) -> Option<Candle> {
        self.candles.next()
    }
}

/// Validate OHLC sanity and strict timestamp ordering over a whole series.
pub fn validate_candles(candles: &[Candle]) -> Result<(), DataError> {
    for candle in candles {
        if !candle.is_sane() {
            return Err(DataError::InsaneCandle {
                timestamp: candle.timestamp,
            });
        }
    }
    for window in candles.windows(2) {
        if window[1].timestamp <= window[0].timestamp {
            return Err(DataError::NonMonotonic {
                prev: window[0].timestamp,
                next: window[1].timestamp,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_candle(day: u32, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn vec_source_drains_then_signals_done() {
        let mut source = VecSource::new(vec![make_candle(1, 100.0), make_candle(2, 101.0)]);
        assert!(source.next_candle().is_some());
        assert!(source.next_candle().is_some());
        assert!(source.next_candle().is_none());
        // Exhausted for good.
        assert!(source.next_candle().is_none());
    }

    #[test]
    fn validate_accepts_ordered_sane_candles() {
        let candles = vec![make_candle(1, 100.0), make_candle(2, 101.0)];
        assert!(validate_candles(&candles).is_ok());
    }

    #[test]
    fn validate_rejects_insane_candle() {
        let mut bad = make_candle(1, 100.0);
        bad.high = 90.0; // below low
        let err = validate_candles(&[bad]).unwrap_err();
        assert!(matches!(err, DataError::InsaneCandle { .. }));
    }

    #[test]
    fn validate_rejects_non_monotonic_timestamps() {
        let candles = vec![make_candle(5, 100.0), make_candle(3, 101.0)];
        let err = validate_candles(&candles).unwrap_err();
        assert!(matches!(err, DataError::NonMonotonic { .. }));
    }

    #[test]
    fn validate_rejects_duplicate_timestamps() {
        let candles = vec![make_candle(5, 100.0), make_candle(5, 101.0)];
        assert!(validate_candles(&candles).is_err());
    }
}
