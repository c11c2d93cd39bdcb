//! Strategy contract — open/close decisions from indicator state.
//!
//! A strategy wraps whatever indicator state it needs and answers two
//! questions once per candle. The predicates are pure with respect to
//! simulation side effects: they read indicator state and never touch the
//! order log or the stop machine. `update` is the per-candle indicator feed
//! the session invokes before querying.

pub mod ma_crossover;
pub mod roc_momentum;

pub use ma_crossover::MaCrossover;
pub use roc_momentum::RocMomentum;

use crate::domain::Candle;

/// Trait for strategies.
///
/// Any type exposing the two predicates is a valid strategy. Amount sizing
/// and stop-distance logic deliberately live elsewhere (session config and
/// stop policy) — the contract is decisions only.
pub trait Strategy: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Feed one candle into the strategy's indicator state.
    ///
    /// Called exactly once per candle, before either predicate is queried.
    fn update(&mut self, candle: &Candle);

    /// Should a new long position be opened on this candle?
    fn should_open_long(&self) -> bool;

    /// Should the existing long position be closed on this candle?
    fn should_close_long(&self) -> bool;
}

/// Strategy that never opens a position. Used in tests and benches.
pub struct NullStrategy;

impl Strategy for NullStrategy {
    fn name(&self) -> &str {
        "null"
    }

    fn update(&mut self, _candle: &Candle) {}

    fn should_open_long(&self) -> bool {
        false
    }

    fn should_close_long(&self) -> bool {
        false
    }
}
