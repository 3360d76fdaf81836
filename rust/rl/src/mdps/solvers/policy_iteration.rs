use super::common::*;
use crate::{error::SolverError, mdps::mdp_solver::*};
use gridworld::*;
use ndarray::Array2;
use tracing::debug;

/// Iterative evaluation of a fixed policy: same sweep and stopping rule as
/// value iteration, without the max over actions.
pub fn policy_evaluation(
    env: &GridWorld,
    pi: &TabularPolicy,
    cfg: &DpConfig,
) -> (Array2<Continous>, Convergence) {
    let states = env.non_terminal_states();
    let mut v = initial_values(env);

    let mut convergence = Convergence::default();
    for iter in 0..cfg.max_iter {
        let mut v_next = v.clone();
        for &s in &states {
            if let Some(a) = pi.get(s) {
                v_next[s] = Dynamics::Stochastic.q_value(env, &v, s, a, cfg.gamma);
            }
        }

        let delta = max_abs_diff(&v, &v_next);
        v = v_next;
        convergence = Convergence {
            iterations: iter + 1,
            converged: delta < cfg.theta,
            delta,
        };

        if convergence.converged {
            break;
        }
    }

    debug!(
        iterations = convergence.iterations,
        delta = convergence.delta,
        "policy evaluation"
    );
    (v, convergence)
}

/// Greedy one-step lookahead on `v`.
pub fn policy_improvement(env: &GridWorld, v: &Array2<Continous>, gamma: Continous) -> TabularPolicy {
    let mut pi = TabularPolicy::empty(env);
    for s in env.non_terminal_states() {
        let q = Action::ALL.map(|a| Dynamics::Stochastic.q_value(env, v, s, a, gamma));
        if let Some((i, _)) = argmax(q) {
            pi.set(s, Action::ALL[i]);
        }
    }
    pi
}

/// Alternates evaluation and improvement, starting from "always down".
#[derive(Debug, Clone)]
pub struct PolicyIteration<'a> {
    env: &'a GridWorld,
    cfg: DpConfig,
    v: Array2<Continous>,
    pi: TabularPolicy,
}

impl<'a> PolicyIteration<'a> {
    pub fn new(env: &'a GridWorld, cfg: DpConfig) -> Result<Self, SolverError> {
        cfg.validate()?;

        Ok(Self {
            env,
            cfg,
            v: initial_values(env),
            pi: TabularPolicy::uniform(env, Action::Down),
        })
    }

    /// Start from `pi` instead of the all-down policy.
    pub fn with_policy(mut self, pi: TabularPolicy) -> Self {
        self.pi = pi;
        self
    }

    pub fn values(&self) -> &Array2<Continous> {
        &self.v
    }

    pub fn policy(&self) -> &TabularPolicy {
        &self.pi
    }

    pub fn into_solution(self, convergence: Convergence) -> Solution {
        Solution {
            values: self.v,
            policy: self.pi,
            convergence,
        }
    }
}

impl MdpSolver for PolicyIteration<'_> {
    fn v_star(&self, s: State) -> Continous {
        self.v.get(s).copied().unwrap_or_default()
    }

    fn q_star(&self, s: State, a: Action) -> Option<Continous> {
        if self.env.is_terminal(s) || !self.env.in_bounds(s) || self.env.is_wall(s) {
            return None;
        }

        Some(Dynamics::Stochastic.q_value(self.env, &self.v, s, a, self.cfg.gamma))
    }

    fn pi_star(&self, s: State) -> Option<Action> {
        self.pi.get(s)
    }

    fn exec(&mut self) -> Convergence {
        let mut convergence = Convergence::default();
        for iter in 0..self.cfg.max_policy_iter {
            let (v, evaluation) = policy_evaluation(self.env, &self.pi, &self.cfg);
            self.v = v;

            let improved = policy_improvement(self.env, &self.v, self.cfg.gamma);
            let stable = improved == self.pi;
            convergence = Convergence {
                iterations: iter + 1,
                converged: stable,
                delta: evaluation.delta,
            };
            debug!(iteration = iter, stable, "policy iteration step");

            if stable {
                break;
            }
            self.pi = improved;
        }

        convergence.log("policy iteration");
        convergence
    }
}

pub fn policy_iteration(env: &GridWorld, cfg: &DpConfig) -> Result<Solution, SolverError> {
    let mut pi = PolicyIteration::new(env, cfg.clone())?;
    let convergence = pi.exec();
    Ok(pi.into_solution(convergence))
}
