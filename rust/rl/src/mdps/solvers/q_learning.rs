use super::common::*;
use crate::{error::*, mdps::mdp_simulator::*};
use gridworld::*;
use ndarray::Array3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub gamma: Continous,

    /// Learning rate.
    pub alpha: Continous,

    pub epsilon_start: Continous,

    pub epsilon_end: Continous,

    /// Multiplier applied to epsilon after every episode.
    pub epsilon_decay: Continous,

    pub episodes: usize,

    /// Start of every episode, the grid's own initial state when unset.
    pub initial_state: Option<State>,

    /// Episodes also end here, not only on terminal states.
    pub target_state: Option<State>,

    /// Per-episode step cap.
    pub max_steps: usize,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            alpha: 0.1,
            epsilon_start: 0.5,
            epsilon_end: 0.05,
            epsilon_decay: 0.99,
            episodes: 500,
            initial_state: None,
            target_state: None,
            max_steps: 10_000,
        }
    }
}

impl QLearningConfig {
    pub fn gamma(mut self, v: Continous) -> Self {
        self.gamma = v;
        self
    }

    pub fn alpha(mut self, v: Continous) -> Self {
        self.alpha = v;
        self
    }

    /// Sets start, floor and decay of the exploration schedule.
    pub fn epsilon(mut self, start: Continous, end: Continous, decay: Continous) -> Self {
        self.epsilon_start = start;
        self.epsilon_end = end;
        self.epsilon_decay = decay;
        self
    }

    pub fn episodes(mut self, v: usize) -> Self {
        self.episodes = v;
        self
    }

    pub fn initial_state(mut self, s: State) -> Self {
        self.initial_state = Some(s);
        self
    }

    pub fn target_state(mut self, s: State) -> Self {
        self.target_state = Some(s);
        self
    }

    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Epsilon for the episode after one run with `epsilon`.
    pub fn decay_epsilon(&self, epsilon: Continous) -> Continous {
        self.epsilon_end.max(self.epsilon_decay * epsilon)
    }

    pub fn validate(&self, env: &GridWorld) -> Result<(), SolverError> {
        check_gamma(self.gamma)?;
        if !(self.alpha > 0. && self.alpha <= 1.) {
            return Err(SolverError::Alpha(self.alpha));
        }
        check_probability("epsilon_start", self.epsilon_start)?;
        check_probability("epsilon_end", self.epsilon_end)?;
        check_probability("epsilon_decay", self.epsilon_decay)?;
        check_positive("max_steps", self.max_steps)?;

        for (kind, state) in [("initial", self.initial_state), ("target", self.target_state)] {
            if let Some(state) = state {
                if !env.in_bounds(state) || env.is_wall(state) {
                    return Err(SolverError::InvalidState { kind, state });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QLearningSolution {
    /// `[action, row, col]`.
    pub q: Array3<Continous>,
    pub policy: TabularPolicy,

    /// Exploration rate after the last episode's decay.
    pub epsilon: Continous,

    /// Episodes cut off by `max_steps`.
    pub truncated: usize,
}

/// Off-policy TD(0) control with an epsilon-greedy behaviour policy.
pub fn q_learning<R: Rng + ?Sized>(
    env: &GridWorld,
    rng: &mut R,
    cfg: &QLearningConfig,
) -> Result<QLearningSolution, SolverError> {
    cfg.validate(env)?;

    let (h, w) = env.shape();
    let start = cfg.initial_state.unwrap_or_else(|| env.initial());
    let mut q = Array3::zeros((N_ACTIONS, h, w));
    let mut epsilon = cfg.epsilon_start;
    let mut truncated = 0;

    for episode in 0..cfg.episodes {
        let mut s = start;
        let mut steps = 0;
        while !env.is_terminal(s) && Some(s) != cfg.target_state {
            if steps == cfg.max_steps {
                truncated += 1;
                break;
            }

            let a = epsilon_greedy(rng, greedy_action(&q, s), epsilon);
            let (next, reward) = env.sample(rng, s, a);
            let bootstrap = env.terminal_reward(next).unwrap_or_else(|| {
                q_row(&q, next).fold(Continous::NEG_INFINITY, Continous::max)
            });

            let idx = [a.index(), s.0, s.1];
            let td_error = reward + cfg.gamma * bootstrap - q[idx];
            q[idx] += cfg.alpha * td_error;

            s = next;
            steps += 1;
        }

        debug!(episode, steps, epsilon, "q-learning episode");
        epsilon = cfg.decay_epsilon(epsilon);
    }

    if truncated > 0 {
        info!(truncated, "q-learning episodes hit the step cap");
    }

    let mut policy = TabularPolicy::empty(env);
    for s in env.non_terminal_states() {
        policy.set(s, greedy_action(&q, s));
    }

    Ok(QLearningSolution {
        q,
        policy,
        epsilon,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use rand::prelude::*;

    #[test]
    fn epsilon_schedule_is_floored() {
        let cfg = QLearningConfig::default().epsilon(1., 0.2, 0.5);
        let schedule =
            std::iter::successors(Some(cfg.epsilon_start), |&e| Some(cfg.decay_epsilon(e)))
                .take(5)
                .collect::<Vec<_>>();

        assert_float_eq!(schedule, vec![1., 0.5, 0.25, 0.2, 0.2], abs_all <= 1e-12);
    }

    #[test]
    fn final_epsilon_after_all_episodes() {
        let env = GridWorld::classic(0.).unwrap();
        let cfg = QLearningConfig::default().epsilon(0.8, 0.1, 0.5).episodes(2);
        let sol = q_learning(&env, &mut StdRng::seed_from_u64(1), &cfg).unwrap();

        assert_float_eq!(sol.epsilon, 0.2, abs <= 1e-12);
    }

    #[test]
    fn single_update_moves_by_alpha() {
        // All-zero Q row, so the tie goes to Up, which bounces off the edge.
        let env = GridWorld::classic(0.).unwrap();
        let cfg = QLearningConfig::default()
            .alpha(0.5)
            .epsilon(0., 0., 1.)
            .episodes(1)
            .initial_state((0, 2))
            .max_steps(1);
        let sol = q_learning(&env, &mut StdRng::seed_from_u64(0), &cfg).unwrap();

        assert_float_eq!(sol.q[[Action::Up.index(), 0, 2]], 0.5 * -0.02, abs <= 1e-12);
        assert_eq!(sol.truncated, 1);
        assert_eq!(sol.q.iter().filter(|&&x| x != 0.).count(), 1);
    }

    #[test]
    fn terminal_next_state_bootstraps_from_its_reward() {
        let env = GridWorld::new(
            &GridWorldConfig::default()
                .size(2, 1)
                .initial((1, 0))
                .terminal(vec![(0, 0)])
                .walls(vec![])
                .rewards(RewardSpec::StepCost {
                    cost: -0.02,
                    terminal_rewards: vec![((0, 0), 1.)],
                })
                .slip_prob(0.),
        )
        .unwrap();
        let cfg = QLearningConfig::default().alpha(1.).epsilon(0., 0., 1.).episodes(1);
        let sol = q_learning(&env, &mut StdRng::seed_from_u64(0), &cfg).unwrap();

        assert_float_eq!(sol.q[[Action::Up.index(), 1, 0]], -0.02 + 0.9, abs <= 1e-12);
        assert_eq!(sol.truncated, 0);
        assert_eq!(sol.policy.get((1, 0)), Some(Action::Up));
        assert_eq!(sol.policy.get((0, 0)), None);
    }

    #[test]
    fn start_on_target_runs_no_steps() {
        let env = GridWorld::classic(0.1).unwrap();
        let cfg = QLearningConfig::default()
            .episodes(3)
            .initial_state((2, 0))
            .target_state((2, 0));
        let sol = q_learning(&env, &mut StdRng::seed_from_u64(0), &cfg).unwrap();

        assert!(sol.q.iter().all(|&x| x == 0.));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let env = GridWorld::classic(0.).unwrap();
        let rng = &mut StdRng::seed_from_u64(0);

        assert_eq!(
            q_learning(&env, rng, &QLearningConfig::default().alpha(0.)).unwrap_err(),
            SolverError::Alpha(0.)
        );
        assert_eq!(
            q_learning(&env, rng, &QLearningConfig::default().initial_state((1, 1))).unwrap_err(),
            SolverError::InvalidState {
                kind: "initial",
                state: (1, 1)
            }
        );
        assert_eq!(
            q_learning(&env, rng, &QLearningConfig::default().target_state((7, 0))).unwrap_err(),
            SolverError::InvalidState {
                kind: "target",
                state: (7, 0)
            }
        );
        assert_eq!(
            q_learning(&env, rng, &QLearningConfig::default().epsilon(1., 0., 2.)).unwrap_err(),
            SolverError::Probability {
                name: "epsilon_decay",
                value: 2.
            }
        );
    }
}
