use gridworld::*;
use ndarray::Array2;
use tracing::{info, warn};

/// How an iterative solver stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    /// Sweeps (or outer iterations) actually run.
    pub iterations: usize,

    /// `false` when the iteration cap was hit first.
    pub converged: bool,

    /// Largest change seen on the last iteration.
    pub delta: Continous,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            iterations: 0,
            converged: false,
            delta: Continous::INFINITY,
        }
    }
}

impl Convergence {
    pub(crate) fn log(&self, solver: &str) {
        if self.converged {
            info!(
                solver,
                iterations = self.iterations,
                delta = self.delta,
                "converged"
            );
        } else {
            warn!(
                solver,
                iterations = self.iterations,
                delta = self.delta,
                "iteration cap reached before convergence"
            );
        }
    }
}

/// Output of the dynamic-programming solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: Array2<Continous>,
    pub policy: TabularPolicy,
    pub convergence: Convergence,
}

/// Markov Decision Process solver - Sutton & Barto 2018.
pub trait MdpSolver {
    fn v_star(&self, s: State) -> Continous;

    fn q_star(&self, s: State, a: Action) -> Option<Continous>;

    fn pi_star(&self, s: State) -> Option<Action>;

    fn exec(&mut self) -> Convergence;
}
