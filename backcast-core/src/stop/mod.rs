//! Stop-loss lifecycle state machine.
//!
//! Tracks, for one position at a time, whether a protective stop exists,
//! needs placing, or needs moving, and gates which events are legal at each
//! point in the position's life. The machine is a flat transition table —
//! pure function over `(state, event)` plus current-state storage. It knows
//! nothing of price, timestamps, or the asset; the session supplies discrete
//! events and reacts to the resulting states.
//!
//! Legal transitions:
//!
//! | State               | Event              | Next state           |
//! |---------------------|--------------------|----------------------|
//! | Neutral             | PositionOpened     | WantInitialStop      |
//! | WantInitialStop     | StopOrderConfirmed | StopSet              |
//! | StopSet             | MoveCondition      | WantMove             |
//! | WantMove            | StopOrderConfirmed | StopSet              |
//! | StopSet             | StoppedOut         | Neutral              |
//! | StopSet             | PositionClosed     | WantCancelAfterClose |
//! | WantCancelAfterClose| StopOrderConfirmed | Neutral              |
//!
//! Every other pair is a protocol violation and is surfaced as an error,
//! never silently dropped — an illegal event means the session or strategy
//! has a sequencing bug.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of the protective stop for the tracked position.
///
/// Exactly one state is active at any time. `Neutral` is both the initial
/// state and the re-entrant state after a position fully closes; the machine
/// cycles indefinitely across positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopState {
    /// No position, no stop.
    Neutral,
    /// Position just opened; the initial stop order is pending.
    WantInitialStop,
    /// A protective stop is resting in the (simulated) market.
    StopSet,
    /// A relocation was requested; the replacement stop is pending.
    WantMove,
    /// The position closed normally; the resting stop awaits cancellation.
    WantCancelAfterClose,
}

/// Discrete event driving the stop machine.
///
/// Events carry no payload — timing and price context live in the order
/// log. `StopOrderConfirmed` is the stop-order lifecycle acknowledgment
/// (placement, relocation, or cancellation of the protective stop); it is
/// deliberately distinct from position fills, which reach the machine only
/// as `PositionOpened` / `PositionClosed` / `StoppedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopEvent {
    PositionOpened,
    StopOrderConfirmed,
    MoveCondition,
    StoppedOut,
    PositionClosed,
}

/// An event was delivered in a state with no defined transition.
///
/// Fatal to the current simulation run: it indicates a session/strategy
/// sequencing bug, so the run must abort rather than continue on a
/// corrupted stop lifecycle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("stop event {event:?} is not legal in state {state:?}")]
pub struct ProtocolViolation {
    pub state: StopState,
    pub event: StopEvent,
}

/// Pure transition function: `(state, event) → next state`.
pub fn transition(state: StopState, event: StopEvent) -> Result<StopState, ProtocolViolation> {
    use StopEvent::*;
    use StopState::*;

    match (state, event) {
        (Neutral, PositionOpened) => Ok(WantInitialStop),
        (WantInitialStop, StopOrderConfirmed) => Ok(StopSet),
        (StopSet, MoveCondition) => Ok(WantMove),
        (WantMove, StopOrderConfirmed) => Ok(StopSet),
        (StopSet, StoppedOut) => Ok(Neutral),
        (StopSet, PositionClosed) => Ok(WantCancelAfterClose),
        (WantCancelAfterClose, StopOrderConfirmed) => Ok(Neutral),
        (state, event) => Err(ProtocolViolation { state, event }),
    }
}

/// Current-state storage around [`transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopMachine {
    state: StopState,
}

impl StopMachine {
    pub fn new() -> Self {
        Self {
            state: StopState::Neutral,
        }
    }

    pub fn state(&self) -> StopState {
        self.state
    }

    /// Apply an event, advancing the machine or rejecting the pair.
    ///
    /// On violation the machine is left unchanged so the error site can
    /// report the exact offending state.
    pub fn apply(&mut self, event: StopEvent) -> Result<StopState, ProtocolViolation> {
        let next = transition(self.state, event)?;
        self.state = next;
        Ok(next)
    }
}

impl Default for StopMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::StopEvent::*;
    use super::StopState::*;
    use super::*;

    const ALL_STATES: [StopState; 5] =
        [Neutral, WantInitialStop, StopSet, WantMove, WantCancelAfterClose];
    const ALL_EVENTS: [StopEvent; 5] = [
        PositionOpened,
        StopOrderConfirmed,
        MoveCondition,
        StoppedOut,
        PositionClosed,
    ];

    const LEGAL: [(StopState, StopEvent, StopState); 7] = [
        (Neutral, PositionOpened, WantInitialStop),
        (WantInitialStop, StopOrderConfirmed, StopSet),
        (StopSet, MoveCondition, WantMove),
        (WantMove, StopOrderConfirmed, StopSet),
        (StopSet, StoppedOut, Neutral),
        (StopSet, PositionClosed, WantCancelAfterClose),
        (WantCancelAfterClose, StopOrderConfirmed, Neutral),
    ];

    #[test]
    fn every_legal_pair_yields_specified_state() {
        for (state, event, expected) in LEGAL {
            assert_eq!(
                transition(state, event),
                Ok(expected),
                "{state:?} + {event:?}"
            );
        }
    }

    #[test]
    fn every_other_pair_is_a_protocol_violation() {
        for state in ALL_STATES {
            for event in ALL_EVENTS {
                if LEGAL.iter().any(|&(s, e, _)| s == state && e == event) {
                    continue;
                }
                assert_eq!(
                    transition(state, event),
                    Err(ProtocolViolation { state, event }),
                    "{state:?} + {event:?} should be rejected"
                );
            }
        }
    }

    #[test]
    fn full_cycle_returns_to_neutral() {
        let mut machine = StopMachine::new();
        assert_eq!(machine.state(), Neutral);

        assert_eq!(machine.apply(PositionOpened), Ok(WantInitialStop));
        assert_eq!(machine.apply(StopOrderConfirmed), Ok(StopSet));
        assert_eq!(machine.apply(MoveCondition), Ok(WantMove));
        assert_eq!(machine.apply(StopOrderConfirmed), Ok(StopSet));
        assert_eq!(machine.apply(StoppedOut), Ok(Neutral));
    }

    #[test]
    fn close_path_cancels_the_resting_stop() {
        let mut machine = StopMachine::new();
        machine.apply(PositionOpened).unwrap();
        machine.apply(StopOrderConfirmed).unwrap();
        assert_eq!(machine.apply(PositionClosed), Ok(WantCancelAfterClose));
        assert_eq!(machine.apply(StopOrderConfirmed), Ok(Neutral));
    }

    #[test]
    fn machine_is_reentrant_across_positions() {
        let mut machine = StopMachine::new();
        for _ in 0..3 {
            machine.apply(PositionOpened).unwrap();
            machine.apply(StopOrderConfirmed).unwrap();
            machine.apply(StoppedOut).unwrap();
            assert_eq!(machine.state(), Neutral);
        }
    }

    #[test]
    fn violation_leaves_machine_unchanged() {
        let mut machine = StopMachine::new();
        let err = machine.apply(StoppedOut).unwrap_err();
        assert_eq!(
            err,
            ProtocolViolation {
                state: Neutral,
                event: StoppedOut
            }
        );
        assert_eq!(machine.state(), Neutral);
    }

    #[test]
    fn violation_message_names_state_and_event() {
        let err = transition(Neutral, MoveCondition).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MoveCondition"));
        assert!(msg.contains("Neutral"));
    }
}
