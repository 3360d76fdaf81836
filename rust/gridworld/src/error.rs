use crate::{Continous, State};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridWorldError {
    #[error("grid must have at least one row and one column, got {height}x{width}")]
    EmptyGrid { height: usize, width: usize },

    #[error("{kind} state {state:?} lies outside the {height}x{width} grid")]
    OutOfBounds {
        kind: &'static str,
        state: State,
        height: usize,
        width: usize,
    },

    #[error("{kind} state {state:?} is a wall")]
    OnWall { kind: &'static str, state: State },

    #[error("reward table is {rows}x{cols} but the grid is {height}x{width}")]
    RewardShape {
        rows: usize,
        cols: usize,
        height: usize,
        width: usize,
    },

    #[error("slip probability {0} is outside [0, 0.5)")]
    SlipProbability(Continous),

    #[error("terminal state {0:?} has no reward")]
    MissingTerminalReward(State),

    #[error("terminal state {0:?} is given more than one reward")]
    DuplicateTerminalReward(State),

    #[error("reward given for {0:?}, which is not a terminal state")]
    UnexpectedTerminalReward(State),

    #[error("unknown action {0:?}")]
    InvalidAction(String),
}
