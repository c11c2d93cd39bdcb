//! Seeded synthetic candle generation.
//!
//! Random-walk daily candles for demos, benches, and determinism tests.
//! All randomness comes from one explicitly seeded RNG and the series
//! starts at a fixed epoch, so a given `(count, seed)` pair always yields
//! the same candles.

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Candle;

const START_PRICE: f64 = 100.0;
const DAILY_DRIFT: f64 = 0.0002;

/// Generate `count` daily candles from `seed`.
pub fn synthetic_candles(count: usize, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();

    let mut close = START_PRICE;
    (0..count)
        .map(|i| {
            let open = close;
            let ret: f64 = DAILY_DRIFT + rng.gen_range(-0.02..0.02);
            close = (open * (1.0 + ret)).max(1.0);

            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000.0..5_000_000.0);

            Candle {
                timestamp: base + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}
