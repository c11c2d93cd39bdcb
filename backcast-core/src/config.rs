//! Serializable run configuration.
//!
//! A `RunConfig` captures everything needed to reproduce a backtest:
//! session parameters, stop policy, and strategy variant with its
//! parameters. Configs load from TOML and hash deterministically, so two
//! runs with identical configs share a run ID.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::engine::{
    BreakevenThenTrail, FixedPercentStop, ReferencePrice, SessionConfig, StopPolicy,
};
use crate::fingerprint::{hash_json, ConfigHash};
use crate::indicators::MaType;
use crate::strategy::{MaCrossover, RocMomentum, Strategy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub backtest: BacktestParams,
    pub strategy: StrategyConfig,
}

/// Session-level parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestParams {
    /// Amount per position.
    pub amount: f64,

    /// Candle price entries and exits execute at.
    #[serde(default = "default_reference")]
    pub reference_price: ReferencePrice,

    pub stop: StopConfig,
}

fn default_reference() -> ReferencePrice {
    ReferencePrice::Close
}

/// Strategy variant selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Fast MA crossing above slow MA opens; fast below slow closes.
    MaCrossover {
        fast_period: usize,
        slow_period: usize,
        #[serde(default = "default_ma_type")]
        ma_type: MaType,
    },

    /// Momentum over a lookback window against an entry threshold.
    RocMomentum { period: usize, threshold: f64 },
}

fn default_ma_type() -> MaType {
    MaType::Sma
}

/// Stop policy selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopConfig {
    /// Fixed stop below entry; never moves.
    FixedPercent { pct: f64 },

    /// Move to breakeven at the trigger, then trail the highest high.
    BreakevenThenTrail {
        initial_pct: f64,
        breakeven_trigger_pct: f64,
        trail_pct: f64,
    },
}

impl RunConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Reject parameter combinations the builders would panic on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.amount <= 0.0 {
            return Err(ConfigError::Invalid("amount must be positive".into()));
        }
        match &self.strategy {
            StrategyConfig::MaCrossover {
                fast_period,
                slow_period,
                ..
            } => {
                if *fast_period < 1 {
                    return Err(ConfigError::Invalid("fast_period must be >= 1".into()));
                }
                if slow_period <= fast_period {
                    return Err(ConfigError::Invalid(
                        "slow_period must be > fast_period".into(),
                    ));
                }
            }
            StrategyConfig::RocMomentum { period, threshold } => {
                if *period < 1 {
                    return Err(ConfigError::Invalid("period must be >= 1".into()));
                }
                if *threshold <= 0.0 {
                    return Err(ConfigError::Invalid("threshold must be positive".into()));
                }
            }
        }
        let pct_in_range = |name: &str, value: f64| -> Result<(), ConfigError> {
            if value <= 0.0 || value >= 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1), got {value}"
                )));
            }
            Ok(())
        };
        match &self.backtest.stop {
            StopConfig::FixedPercent { pct } => pct_in_range("pct", *pct)?,
            StopConfig::BreakevenThenTrail {
                initial_pct,
                breakeven_trigger_pct,
                trail_pct,
            } => {
                pct_in_range("initial_pct", *initial_pct)?;
                pct_in_range("breakeven_trigger_pct", *breakeven_trigger_pct)?;
                pct_in_range("trail_pct", *trail_pct)?;
            }
        }
        Ok(())
    }

    /// Deterministic identity of this configuration.
    pub fn run_id(&self) -> ConfigHash {
        ConfigHash(hash_json(self))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            amount: self.backtest.amount,
            reference: self.backtest.reference_price,
        }
    }

    pub fn build_strategy(&self) -> Box<dyn Strategy> {
        match &self.strategy {
            StrategyConfig::MaCrossover {
                fast_period,
                slow_period,
                ma_type,
            } => Box::new(MaCrossover::new(*fast_period, *slow_period, *ma_type)),
            StrategyConfig::RocMomentum { period, threshold } => {
                Box::new(RocMomentum::new(*period, *threshold))
            }
        }
    }

    pub fn build_stop_policy(&self) -> Box<dyn StopPolicy> {
        match &self.backtest.stop {
            StopConfig::FixedPercent { pct } => Box::new(FixedPercentStop::new(*pct)),
            StopConfig::BreakevenThenTrail {
                initial_pct,
                breakeven_trigger_pct,
                trail_pct,
            } => Box::new(BreakevenThenTrail::new(
                *initial_pct,
                *breakeven_trigger_pct,
                *trail_pct,
            )),
        }
    }
}
