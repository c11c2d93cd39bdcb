//! Streaming indicators.
//!
//! One-value-per-candle incremental counterparts of batch indicator series:
//! strategies feed each close price in as it arrives and read back the
//! current value. `value()` returns `None` until the indicator has seen a
//! full warmup window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Simple moving average over a rolling window of close prices.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, close: f64) {
        self.window.push_back(close);
        self.sum += close;
        if self.window.len() > self.period {
            // pop_front cannot fail here; the window just exceeded period
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        if self.window.len() < self.period {
            return None;
        }
        Some(self.sum / self.period as f64)
    }
}

/// Exponential moving average with smoothing `2 / (period + 1)`.
///
/// Warm after `period` samples, matching [`Sma`], so a fast/slow pair warms
/// together at the slow period.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    current: Option<f64>,
    samples: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            current: None,
            samples: 0,
        }
    }

    pub fn update(&mut self, close: f64) {
        self.samples += 1;
        self.current = Some(match self.current {
            Some(prev) => prev + self.alpha * (close - prev),
            None => close,
        });
    }

    pub fn value(&self) -> Option<f64> {
        if self.samples < self.period {
            return None;
        }
        self.current
    }
}

/// Rate of change: fractional price change over `period` candles.
#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    window: VecDeque<f64>,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
        }
    }

    pub fn update(&mut self, close: f64) {
        self.window.push_back(close);
        if self.window.len() > self.period + 1 {
            self.window.pop_front();
        }
    }

    pub fn value(&self) -> Option<f64> {
        if self.window.len() < self.period + 1 {
            return None;
        }
        let oldest = *self.window.front()?;
        let newest = *self.window.back()?;
        if oldest == 0.0 {
            return None;
        }
        Some((newest - oldest) / oldest)
    }
}

/// Moving average type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaType {
    Sma,
    Ema,
}

/// A moving average of either type behind one interface.
#[derive(Debug, Clone)]
pub enum MovingAverage {
    Sma(Sma),
    Ema(Ema),
}

impl MovingAverage {
    pub fn new(ma_type: MaType, period: usize) -> Self {
        match ma_type {
            MaType::Sma => MovingAverage::Sma(Sma::new(period)),
            MaType::Ema => MovingAverage::Ema(Ema::new(period)),
        }
    }

    pub fn update(&mut self, close: f64) {
        match self {
            MovingAverage::Sma(sma) => sma.update(close),
            MovingAverage::Ema(ema) => ema.update(close),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            MovingAverage::Sma(sma) => sma.value(),
            MovingAverage::Ema(ema) => ema.value(),
        }
    }
}
