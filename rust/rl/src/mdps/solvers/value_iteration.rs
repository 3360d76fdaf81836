use super::common::*;
use crate::{error::SolverError, mdps::mdp_solver::*};
use gridworld::*;
use ndarray::{Array2, Array3};
use tracing::debug;

/// Synchronous value iteration over every non-terminal state.
#[derive(Debug, Clone)]
pub struct ValueIteration<'a> {
    env: &'a GridWorld,
    cfg: DpConfig,
    dynamics: Dynamics,
    v: Array2<Continous>,
    q: Array3<Continous>,
    pi: TabularPolicy,
}

impl<'a> ValueIteration<'a> {
    pub fn new(env: &'a GridWorld, cfg: DpConfig) -> Result<Self, SolverError> {
        cfg.validate()?;

        let (h, w) = env.shape();
        Ok(Self {
            env,
            cfg,
            dynamics: Dynamics::Stochastic,
            v: initial_values(env),
            q: Array3::zeros((N_ACTIONS, h, w)),
            pi: TabularPolicy::empty(env),
        })
    }

    /// Back up through `step` alone, ignoring slips.
    pub fn deterministic(mut self) -> Self {
        self.dynamics = Dynamics::Deterministic;
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

impl MdpSolver for ValueIteration<'_> {
    fn v_star(&self, s: State) -> Continous {
        self.v.get(s).copied().unwrap_or_default()
    }

    fn q_star(&self, s: State, a: Action) -> Option<Continous> {
        if self.env.is_terminal(s) || !self.env.in_bounds(s) || self.env.is_wall(s) {
            return None;
        }

        Some(self.q[[a.index(), s.0, s.1]])
    }

    fn pi_star(&self, s: State) -> Option<Action> {
        self.pi.get(s)
    }

    fn exec(&mut self) -> Convergence {
        let env = self.env;
        let gamma = self.cfg.gamma;
        let states = env.non_terminal_states();

        let mut convergence = Convergence::default();
        for iter in 0..self.cfg.max_iter {
            let mut v_next = self.v.clone();
            for &s in &states {
                for a in Action::ALL {
                    self.q[[a.index(), s.0, s.1]] = self.dynamics.q_value(env, &self.v, s, a, gamma);
                }

                if let Some((i, best)) = argmax(q_row(&self.q, s)) {
                    v_next[s] = best;
                    self.pi.set(s, Action::ALL[i]);
                }
            }

            let delta = max_abs_diff(&self.v, &v_next);
            self.v = v_next;
            convergence = Convergence {
                iterations: iter + 1,
                converged: delta < self.cfg.theta,
                delta,
            };
            debug!(iteration = iter, delta, "value iteration sweep");

            if convergence.converged {
                break;
            }
        }

        convergence.log("value iteration");
        convergence
    }
}

/// Value iteration on the slippery model.
pub fn value_iteration(env: &GridWorld, cfg: &DpConfig) -> Result<Solution, SolverError> {
    let mut vi = ValueIteration::new(env, cfg.clone())?;
    let convergence = vi.exec();
    Ok(vi.into_solution(convergence))
}

/// Value iteration that only looks at the intended move of every action.
pub fn value_iteration_deterministic(
    env: &GridWorld,
    cfg: &DpConfig,
) -> Result<Solution, SolverError> {
    let mut vi = ValueIteration::new(env, cfg.clone())?.deterministic();
    let convergence = vi.exec();
    Ok(vi.into_solution(convergence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;

    #[test]
    fn deterministic_classic_values() {
        let env = GridWorld::classic(0.).unwrap();
        let sol = value_iteration_deterministic(&env, &DpConfig::default()).unwrap();

        assert!(sol.convergence.converged);
        let expected = [
            ((0, 0), 0.6748),
            ((0, 1), 0.772),
            ((0, 2), 0.88),
            ((0, 3), 1.),
            ((1, 0), 0.58732),
            ((1, 2), 0.772),
            ((1, 3), -1.),
            ((2, 0), 0.508588),
            ((2, 1), 0.58732),
            ((2, 2), 0.6748),
            ((2, 3), 0.58732),
        ];
        for (s, v) in expected {
            assert_float_eq!(sol.values[s], v, abs <= 1e-9);
        }

        assert_eq!(sol.policy.get((0, 0)), Some(Action::Right));
        assert_eq!(sol.policy.get((1, 2)), Some(Action::Up));
        assert_eq!(sol.policy.get((2, 3)), Some(Action::Left));
        assert_eq!(sol.policy.get((0, 3)), None);
        assert_eq!(sol.policy.get((1, 1)), None);
    }

    #[test]
    fn cap_without_convergence_is_reported() {
        let env = GridWorld::classic(0.1).unwrap();
        let sol = value_iteration(&env, &DpConfig::default().max_iter(2)).unwrap();

        assert_eq!(sol.convergence.iterations, 2);
        assert!(!sol.convergence.converged);
        assert!(sol.convergence.delta > 0.);
    }

    #[test]
    fn solver_views() {
        let env = GridWorld::classic(0.).unwrap();
        let mut vi = ValueIteration::new(&env, DpConfig::default()).unwrap();
        vi.exec();

        assert_float_eq!(vi.v_star((0, 2)), 0.88, abs <= 1e-9);
        assert_float_eq!(vi.q_star((0, 2), Action::Right).unwrap(), 0.88, abs <= 1e-9);
        assert_float_eq!(vi.q_star((0, 2), Action::Up).unwrap(), 0.772, abs <= 1e-9);
        assert_eq!(vi.q_star((0, 3), Action::Up), None);
        assert_eq!(vi.q_star((1, 1), Action::Up), None);
        assert_eq!(vi.pi_star((0, 2)), Some(Action::Right));
        assert_eq!(vi.policy().get((0, 2)), Some(Action::Right));
        assert_eq!(vi.values()[(0, 3)], 1.);
    }

    #[test]
    fn invalid_gamma_is_rejected() {
        let env = GridWorld::classic(0.).unwrap();
        assert_eq!(
            value_iteration(&env, &DpConfig::default().gamma(-0.1)).unwrap_err(),
            SolverError::Gamma(-0.1)
        );
    }
}
