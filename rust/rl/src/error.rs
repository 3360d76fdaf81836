use gridworld::{Continous, GridWorldError, State};
use thiserror::Error;

/// Rejected hyperparameters. Hitting an iteration cap is not an error, see
/// [`Convergence`](crate::Convergence).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("discount factor {0} is outside [0, 1]")]
    Gamma(Continous),

    #[error("convergence threshold {0} must be positive")]
    Theta(Continous),

    #[error("learning rate {0} is outside (0, 1]")]
    Alpha(Continous),

    #[error("{name} {value} is outside [0, 1]")]
    Probability { name: &'static str, value: Continous },

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("{kind} state {state:?} is not a valid state of the grid")]
    InvalidState { kind: &'static str, state: State },

    #[error(transparent)]
    GridWorld(#[from] GridWorldError),
}

pub(crate) fn check_gamma(gamma: Continous) -> Result<(), SolverError> {
    if (0.0..=1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(SolverError::Gamma(gamma))
    }
}

pub(crate) fn check_probability(name: &'static str, value: Continous) -> Result<(), SolverError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SolverError::Probability { name, value })
    }
}

pub(crate) fn check_positive(name: &'static str, value: usize) -> Result<(), SolverError> {
    if value == 0 {
        Err(SolverError::Zero(name))
    } else {
        Ok(())
    }
}
