use crate::GridWorldError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const N_ACTIONS: usize = 4;

/// Moves available in every state. The ordinal doubles as the index into the
/// first axis of a Q table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; N_ACTIONS] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Result<Self, GridWorldError> {
        Self::ALL
            .get(i)
            .copied()
            .ok_or_else(|| GridWorldError::InvalidAction(i.to_string()))
    }

    /// Unit `(d_row, d_col)` displacement.
    pub fn displacement(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// The two directions a slip can send the agent.
    pub fn perpendicular(self) -> [Action; 2] {
        match self {
            Action::Up | Action::Down => [Action::Right, Action::Left],
            Action::Left | Action::Right => [Action::Up, Action::Down],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Action::Up => '\u{2191}',
            Action::Down => '\u{2193}',
            Action::Left => '\u{2190}',
            Action::Right => '\u{2192}',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = GridWorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| GridWorldError::InvalidAction(s.to_string()))
    }
}
