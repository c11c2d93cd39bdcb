//! Deterministic identity hashes for configs, datasets, and reports.
//!
//! Everything is hashed as canonical JSON via BLAKE3, so two runs with
//! identical inputs produce identical hashes across builds and platforms.
//! The determinism tests compare report hashes; the CLI records all three
//! in its run manifest.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Candle;

/// BLAKE3 hex digest of canonical JSON.
pub(crate) fn hash_json<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("value must serialize");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

/// Identity of a run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content identity of a candle dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content identity of a finished trade report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportHash(pub String);

impl fmt::Display for ReportHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash a candle dataset.
pub fn dataset_hash(candles: &[Candle]) -> DatasetHash {
    DatasetHash(hash_json(&candles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        assert_eq!(dataset_hash(&candles), dataset_hash(&candles));
    }

    #[test]
    fn dataset_hash_differs_for_different_data() {
        let a = make_candles(&[100.0, 101.0]);
        let b = make_candles(&[100.0, 102.0]);
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn hash_display_is_hex() {
        let candles = make_candles(&[100.0]);
        let hash = dataset_hash(&candles);
        assert_eq!(hash.to_string().len(), 64);
        assert!(hash.to_string().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
