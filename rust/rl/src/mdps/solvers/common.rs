use crate::error::*;
use gridworld::*;
use ndarray::{Array2, Array3, Zip};
use serde::{Deserialize, Serialize};

/// Hyperparameters shared by value and policy iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpConfig {
    pub gamma: Continous,

    /// Sweeps stop once no value moves by `theta` or more.
    pub theta: Continous,

    /// Cap on sweeps, per evaluation for policy iteration.
    pub max_iter: usize,

    /// Cap on evaluate/improve rounds of policy iteration.
    pub max_policy_iter: usize,
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            theta: 1e-10,
            max_iter: 1000,
            max_policy_iter: 500,
        }
    }
}

impl DpConfig {
    pub fn gamma(mut self, v: Continous) -> Self {
        self.gamma = v;
        self
    }

    pub fn theta(mut self, v: Continous) -> Self {
        self.theta = v;
        self
    }

    pub fn max_iter(mut self, v: usize) -> Self {
        self.max_iter = v;
        self
    }

    pub fn max_policy_iter(mut self, v: usize) -> Self {
        self.max_policy_iter = v;
        self
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        check_gamma(self.gamma)?;
        if self.theta > 0. {
            Ok(())
        } else {
            Err(SolverError::Theta(self.theta))
        }
    }
}

/// Which model a backup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dynamics {
    /// Every slip outcome, weighted by its probability.
    #[default]
    Stochastic,

    /// Only the intended move.
    Deterministic,
}

impl Dynamics {
    pub fn outcomes(self, env: &GridWorld, s: State, a: Action) -> Vec<Transition> {
        match self {
            Dynamics::Stochastic => env.transition_probs(s, a),
            Dynamics::Deterministic => {
                let (next_state, reward) = env.step(s, a);
                vec![Transition {
                    probability: 1.,
                    next_state,
                    reward,
                }]
            }
        }
    }

    /// One-step lookahead `sum p * (r + gamma * V[s'])`.
    pub fn q_value(
        self,
        env: &GridWorld,
        v: &Array2<Continous>,
        s: State,
        a: Action,
        gamma: Continous,
    ) -> Continous {
        self.outcomes(env, s, a)
            .iter()
            .map(|t| t.probability * (t.reward + gamma * v[t.next_state]))
            .sum()
    }
}

/// Zeros everywhere except terminal cells, which hold their reward.
pub fn initial_values(env: &GridWorld) -> Array2<Continous> {
    let mut v = Array2::zeros(env.shape());
    for &t in env.terminals() {
        v[t] = env.terminal_reward(t).unwrap_or_default();
    }
    v
}

pub fn max_abs_diff<D: ndarray::Dimension>(
    a: &ndarray::Array<Continous, D>,
    b: &ndarray::Array<Continous, D>,
) -> Continous {
    Zip::from(a)
        .and(b)
        .fold(0., |acc: Continous, x, y| acc.max((x - y).abs()))
}

pub fn q_row(q: &Array3<Continous>, s: State) -> impl Iterator<Item = Continous> + '_ {
    Action::ALL.into_iter().map(move |a| q[[a.index(), s.0, s.1]])
}

/// Greedy action over a Q row; the lowest action index wins ties.
pub fn greedy_action(q: &Array3<Continous>, s: State) -> Action {
    argmax(q_row(q, s)).map_or(Action::Up, |(i, _)| Action::ALL[i])
}

/// `max_a Q[a, s]`, or the terminal reward for terminal cells.
pub fn values_from_q(env: &GridWorld, q: &Array3<Continous>) -> Array2<Continous> {
    let mut v = initial_values(env);
    for s in env.non_terminal_states() {
        v[s] = argmax(q_row(q, s)).map_or(0., |(_, best)| best);
    }
    v
}
