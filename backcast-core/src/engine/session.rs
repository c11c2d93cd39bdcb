//! Simulator session — the candle-driven event loop.
//!
//! For each candle, in order: verify stream ordering, feed the strategy,
//! check the resting stop against the candle's range, then act on the
//! strategy's predicates or the stop policy. Every fill is appended to the
//! order log and every lifecycle step is delivered to the stop machine, so
//! a sequencing bug anywhere surfaces as a fatal error instead of a
//! corrupted report.
//!
//! Within one candle the intrabar stop trigger is evaluated before the
//! strategy's close-at-close decision: the stop is resting in the simulated
//! market and executes the moment price touches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::CandleSource;
use crate::domain::{Candle, Fill, LogError, OrderLog, Side};
use crate::report::{build_report, MarkPrice, ReportError, TradeReport};
use crate::stop::{ProtocolViolation, StopEvent, StopMachine, StopState};
use crate::strategy::Strategy;

use super::position::OpenPosition;
use super::stop_policy::StopPolicy;

/// Which candle price entries and exits execute at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePrice {
    Close,
    Open,
}

/// Session parameters. Sizing is fixed per run; decision logic lives in the
/// strategy, stop placement in the stop policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Amount per position.
    pub amount: f64,
    pub reference: ReferencePrice,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            amount: 1.0,
            reference: ReferencePrice::Close,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("candle at {next} does not advance the stream (previous candle at {prev})")]
    NonMonotonicCandle {
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}

/// One backtest run over one candle stream.
///
/// Owns the order log, the stop machine, and the single tracked position
/// slot. The strategy and stop policy are borrowed per call, never owned.
/// Created empty, mutated once per candle, read-only once the stream
/// completes.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    log: OrderLog,
    machine: StopMachine,
    position: Option<OpenPosition>,
    last_seen: Option<MarkPrice>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            log: OrderLog::new(),
            machine: StopMachine::new(),
            position: None,
            last_seen: None,
        }
    }

    /// Process a single candle.
    pub fn process_candle(
        &mut self,
        candle: &Candle,
        strategy: &mut dyn Strategy,
        policy: &dyn StopPolicy,
    ) -> Result<(), SessionError> {
        // The data layer validates ordering; the session re-checks it
        // defensively since the reporter depends on log order being
        // simulation time order.
        if let Some(last) = self.last_seen {
            if candle.timestamp <= last.timestamp {
                return Err(SessionError::NonMonotonicCandle {
                    prev: last.timestamp,
                    next: candle.timestamp,
                });
            }
        }

        strategy.update(candle);

        match self.position.take() {
            None => {
                if strategy.should_open_long() {
                    self.open_long(candle, policy)?;
                }
            }
            Some(mut position) => {
                position.observe(candle);

                if candle.low <= position.stop_price {
                    self.stop_out(&position, candle)?;
                } else if strategy.should_close_long() {
                    self.close_long(&position, candle)?;
                } else {
                    self.manage_stop(&mut position, candle, policy)?;
                    self.position = Some(position);
                }
            }
        }

        self.last_seen = Some(MarkPrice {
            timestamp: candle.timestamp,
            price: candle.close,
        });
        Ok(())
    }

    /// Drain a candle source to completion.
    pub fn run(
        &mut self,
        source: &mut dyn CandleSource,
        strategy: &mut dyn Strategy,
        policy: &dyn StopPolicy,
    ) -> Result<(), SessionError> {
        while let Some(candle) = source.next_candle() {
            self.process_candle(&candle, strategy, policy)?;
        }
        Ok(())
    }

    fn reference_price(&self, candle: &Candle) -> f64 {
        match self.config.reference {
            ReferencePrice::Close => candle.close,
            ReferencePrice::Open => candle.open,
        }
    }

    fn open_long(&mut self, candle: &Candle, policy: &dyn StopPolicy) -> Result<(), SessionError> {
        let price = self.reference_price(candle);
        self.log.append(Fill {
            timestamp: candle.timestamp,
            price,
            amount: self.config.amount,
            side: Side::Buy,
        })?;
        self.machine.apply(StopEvent::PositionOpened)?;

        let stop_price = policy.initial_stop(price);
        self.machine.apply(StopEvent::StopOrderConfirmed)?;

        self.position = Some(OpenPosition {
            entry_ts: candle.timestamp,
            entry_price: price,
            amount: self.config.amount,
            stop_price,
            highest_since_entry: price,
        });
        Ok(())
    }

    fn stop_out(&mut self, position: &OpenPosition, candle: &Candle) -> Result<(), SessionError> {
        // A gap through the stop fills at the open, not at the stop level.
        let price = if candle.open < position.stop_price {
            candle.open
        } else {
            position.stop_price
        };
        self.log.append(Fill {
            timestamp: candle.timestamp,
            price,
            amount: position.amount,
            side: Side::Sell,
        })?;
        self.machine.apply(StopEvent::StoppedOut)?;
        Ok(())
    }

    fn close_long(&mut self, position: &OpenPosition, candle: &Candle) -> Result<(), SessionError> {
        let price = self.reference_price(candle);
        self.log.append(Fill {
            timestamp: candle.timestamp,
            price,
            amount: position.amount,
            side: Side::Sell,
        })?;
        self.machine.apply(StopEvent::PositionClosed)?;
        // The resting stop's cancellation is acknowledged immediately in
        // simulation, returning the machine to Neutral.
        self.machine.apply(StopEvent::StopOrderConfirmed)?;
        Ok(())
    }

    fn manage_stop(
        &mut self,
        position: &mut OpenPosition,
        candle: &Candle,
        policy: &dyn StopPolicy,
    ) -> Result<(), SessionError> {
        if let Some(desired) = policy.desired_stop(position, candle) {
            // Ratchet: stops may tighten but never loosen.
            if desired > position.stop_price {
                self.machine.apply(StopEvent::MoveCondition)?;
                position.stop_price = desired;
                self.machine.apply(StopEvent::StopOrderConfirmed)?;
            }
        }
        Ok(())
    }

    pub fn order_log(&self) -> &OrderLog {
        &self.log
    }

    pub fn stop_state(&self) -> StopState {
        self.machine.state()
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn last_seen(&self) -> Option<MarkPrice> {
        self.last_seen
    }

    /// Build the trade report for the completed (or in-progress) run.
    pub fn report(&self) -> Result<TradeReport, ReportError> {
        build_report(&self.log, self.last_seen)
    }
}
