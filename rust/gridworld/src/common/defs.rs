use crate::Action;

pub type Continous = f64;

/// Grid coordinate as `(row, col)`, top left is `(0, 0)`.
pub type State = (usize, usize);

/// One outcome of taking an action in a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub probability: Continous,
    pub next_state: State,
    pub reward: Continous,
}

/// A single `(s, a, r)` record of an episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeEvent {
    pub state: State,
    pub action: Action,
    pub reward: Continous,
}
