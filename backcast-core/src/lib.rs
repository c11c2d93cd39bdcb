//! Backcast Core — deterministic single-asset candle-replay backtesting.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (candles, fills, the order log, trades)
//! - Stop-loss lifecycle state machine (flat transition table)
//! - Strategy trait with two concrete variants
//! - Candle-driven session event loop with stop policies
//! - Trade reporter (fill pairing, PnL, aggregate stats)
//! - Data layer (CSV ingest, synthetic generation, boundary validation)
//! - Deterministic run/dataset/report fingerprinting

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod report;
pub mod stop;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    ///
    /// Callers parallelize across independent backtest runs (one session
    /// per run); if any of these types loses Send/Sync the build breaks
    /// here instead of at the call site.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<domain::OrderLog>();
        require_sync::<domain::OrderLog>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        require_send::<stop::StopMachine>();
        require_sync::<stop::StopMachine>();

        require_send::<engine::Session>();
        require_sync::<engine::Session>();
        require_send::<engine::SessionConfig>();
        require_sync::<engine::SessionConfig>();

        require_send::<report::TradeReport>();
        require_sync::<report::TradeReport>();

        require_send::<config::RunConfig>();
        require_sync::<config::RunConfig>();
    }

    /// Architecture contract: strategy and stop policy trait objects are
    /// `Send + Sync`, so compositions can be shared across run workers.
    #[test]
    fn trait_objects_are_send_sync() {
        fn require_send_sync<T: Send + Sync + ?Sized>() {}
        require_send_sync::<dyn strategy::Strategy>();
        require_send_sync::<dyn engine::StopPolicy>();
    }
}
