use super::common::*;
use crate::{error::*, mdps::mdp_simulator::*, mdps::mdp_solver::*};
use gridworld::*;
use ndarray::{Array2, Array3};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

/// Which occurrences of a state (or state-action pair) in an episode get
/// credited with the return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitRule {
    #[default]
    First,
    Every,
}

impl VisitRule {
    fn admits<K, F>(self, ep: &[EpisodeEvent], t: usize, key: F) -> bool
    where
        K: PartialEq,
        F: Fn(&EpisodeEvent) -> K,
    {
        match self {
            VisitRule::First => is_first_visit(ep, t, key),
            VisitRule::Every => true,
        }
    }
}

fn is_first_visit<K, F>(ep: &[EpisodeEvent], t: usize, key: F) -> bool
where
    K: PartialEq,
    F: Fn(&EpisodeEvent) -> K,
{
    if t == 0 {
        return true;
    }

    let k = key(&ep[t]);
    !ep.iter().take(t).any(|x| key(x) == k)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McConfig {
    pub gamma: Continous,

    /// Episode length cap.
    pub length: usize,

    /// Episodes to run at most.
    pub max_iter: usize,

    /// Consecutive episodes without a policy change needed to stop early.
    /// The default of 1 stops at the first unchanged episode, usually long
    /// before Q settles; raise it together with `max_iter` for usable policies.
    pub stable_iters: usize,

    pub exploration: Exploration,

    pub visit: VisitRule,
}

impl Default for McConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            length: 25,
            max_iter: 25,
            stable_iters: 1,
            exploration: Exploration::Greedy,
            visit: VisitRule::First,
        }
    }
}

impl McConfig {
    pub fn gamma(mut self, v: Continous) -> Self {
        self.gamma = v;
        self
    }

    pub fn length(mut self, v: usize) -> Self {
        self.length = v;
        self
    }

    pub fn max_iter(mut self, v: usize) -> Self {
        self.max_iter = v;
        self
    }

    pub fn stable_iters(mut self, v: usize) -> Self {
        self.stable_iters = v;
        self
    }

    pub fn exploration(mut self, v: Exploration) -> Self {
        self.exploration = v;
        self
    }

    pub fn visit(mut self, v: VisitRule) -> Self {
        self.visit = v;
        self
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        check_gamma(self.gamma)?;
        check_positive("stable_iters", self.stable_iters)?;
        if let Exploration::EpsilonSoft(epsilon) = self.exploration {
            check_probability("epsilon", epsilon)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveMcConfig {
    pub gamma: Continous,

    /// Length of every rollout.
    pub length: usize,

    /// Rollouts averaged per state-action pair.
    pub samples: usize,

    pub max_iter: usize,
}

impl Default for NaiveMcConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            length: 25,
            samples: 20,
            max_iter: 20,
        }
    }
}

impl NaiveMcConfig {
    pub fn gamma(mut self, v: Continous) -> Self {
        self.gamma = v;
        self
    }

    pub fn length(mut self, v: usize) -> Self {
        self.length = v;
        self
    }

    pub fn samples(mut self, v: usize) -> Self {
        self.samples = v;
        self
    }

    pub fn max_iter(mut self, v: usize) -> Self {
        self.max_iter = v;
        self
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        check_gamma(self.gamma)?;
        check_positive("samples", self.samples)
    }
}

/// Output of the Monte-Carlo control methods.
#[derive(Debug, Clone, PartialEq)]
pub struct McSolution {
    /// `[action, row, col]`.
    pub q: Array3<Continous>,
    pub policy: TabularPolicy,
    pub convergence: Convergence,
}

/// Credits `episode`'s returns to `q` as running means, `n` holding the
/// visit counts carried over from earlier episodes. Returns the largest
/// change made to `q`.
pub fn first_visit_q_update(
    env: &GridWorld,
    episode: &Episode,
    q: &mut Array3<Continous>,
    n: &mut Array3<usize>,
    gamma: Continous,
    rule: VisitRule,
) -> Continous {
    let ep = &episode.events;
    let mut g = env.terminal_reward(episode.final_state).unwrap_or(0.);
    let mut delta: Continous = 0.;
    for t in (0..ep.len()).rev() {
        let EpisodeEvent {
            state,
            action,
            reward,
        } = ep[t];
        g = reward + gamma * g;

        if rule.admits(ep, t, |e| (e.state, e.action)) {
            let idx = [action.index(), state.0, state.1];
            n[idx] += 1;
            let step = (g - q[idx]) / n[idx] as Continous;
            q[idx] += step;
            delta = delta.max(step.abs());
        }
    }
    delta
}

/// Monte-Carlo control with exploring starts: one episode per iteration
/// from a random non-terminal state and random action, then greedy
/// improvement on the running Q means.
pub fn first_visit_mc<R: Rng + ?Sized>(
    env: &GridWorld,
    rng: &mut R,
    cfg: &McConfig,
) -> Result<McSolution, SolverError> {
    cfg.validate()?;

    let (h, w) = env.shape();
    let states = env.non_terminal_states();
    let mut pi = TabularPolicy::random(env, rng);
    let mut q = Array3::zeros((N_ACTIONS, h, w));
    let mut n = Array3::zeros((N_ACTIONS, h, w));

    let mut convergence = Convergence::default();
    let mut stable = 0;
    for iter in 0..cfg.max_iter {
        let Some(&s) = states.choose(rng) else {
            convergence.converged = true;
            break;
        };
        let a = Action::ALL[rng.gen_range(0..N_ACTIONS)];

        let ep = generate_episode(env, rng, s, a, &pi, cfg.length, cfg.exploration);
        let delta = first_visit_q_update(env, &ep, &mut q, &mut n, cfg.gamma, cfg.visit);

        let improved = mc_policy_improvement(env, &q);
        stable = if improved == pi { stable + 1 } else { 0 };
        pi = improved;

        convergence = Convergence {
            iterations: iter + 1,
            converged: stable >= cfg.stable_iters,
            delta,
        };
        if convergence.converged {
            break;
        }
    }

    convergence.log("first-visit monte carlo");
    Ok(McSolution {
        q,
        policy: pi,
        convergence,
    })
}

/// Mean discounted return of `samples` rollouts that start with `(s, a)`
/// and then follow `pi`.
#[allow(clippy::too_many_arguments)]
pub fn q_value_estimate<R: Rng + ?Sized>(
    env: &GridWorld,
    rng: &mut R,
    s: State,
    a: Action,
    pi: &dyn Policy,
    gamma: Continous,
    length: usize,
    samples: usize,
) -> Continous {
    let total: Continous = (0..samples)
        .map(|_| generate_episode(env, rng, s, a, pi, length, Exploration::Greedy))
        .filter(|ep| !ep.is_empty())
        .map(|ep| discounted_return(env, &ep, gamma))
        .sum();

    total / samples as Continous
}

/// Naive Q estimate for every non-terminal state and action.
pub fn q_value_mc_estimate<R: Rng + ?Sized>(
    env: &GridWorld,
    rng: &mut R,
    pi: &dyn Policy,
    gamma: Continous,
    length: usize,
    samples: usize,
) -> Array3<Continous> {
    let (h, w) = env.shape();
    let mut q = Array3::zeros((N_ACTIONS, h, w));
    for s in env.non_terminal_states() {
        for a in Action::ALL {
            q[[a.index(), s.0, s.1]] = q_value_estimate(env, rng, s, a, pi, gamma, length, samples);
        }
    }
    q
}

/// Greedy policy over `q`.
pub fn mc_policy_improvement(env: &GridWorld, q: &Array3<Continous>) -> TabularPolicy {
    let mut pi = TabularPolicy::empty(env);
    for s in env.non_terminal_states() {
        pi.set(s, greedy_action(q, s));
    }
    pi
}

/// Monte-Carlo policy iteration that re-estimates every Q value from scratch
/// on each round.
pub fn naive_mc<R: Rng + ?Sized>(
    env: &GridWorld,
    rng: &mut R,
    cfg: &NaiveMcConfig,
) -> Result<McSolution, SolverError> {
    cfg.validate()?;

    let (h, w) = env.shape();
    let mut pi = TabularPolicy::random(env, rng);
    let mut q = Array3::zeros((N_ACTIONS, h, w));

    let mut convergence = Convergence::default();
    for iter in 0..cfg.max_iter {
        let q_next = q_value_mc_estimate(env, rng, &pi, cfg.gamma, cfg.length, cfg.samples);
        let improved = mc_policy_improvement(env, &q_next);
        let stable = improved == pi;

        convergence = Convergence {
            iterations: iter + 1,
            converged: stable,
            delta: max_abs_diff(&q, &q_next),
        };
        q = q_next;
        debug!(iteration = iter, stable, "naive monte carlo round");

        if stable {
            break;
        }
        pi = improved;
    }

    convergence.log("naive monte carlo");
    Ok(McSolution {
        q,
        policy: pi,
        convergence,
    })
}

/// Monte-Carlo prediction of state values from a batch of episodes. Cells
/// never visited stay at zero; terminal cells hold their reward.
pub fn mc_state_values(
    env: &GridWorld,
    ep_gen: Rc<dyn EpisodeGenerator + '_>,
    n_ep: usize,
    seed: Option<u64>,
    gamma: Continous,
    rule: VisitRule,
) -> Array2<Continous> {
    let mut returns = Array2::<Continous>::zeros(env.shape());
    let mut visits = Array2::<usize>::zeros(env.shape());

    for episode in ep_gen.generate(n_ep, seed) {
        let ep = &episode.events;
        let mut g = env.terminal_reward(episode.final_state).unwrap_or(0.);
        for t in (0..ep.len()).rev() {
            g = ep[t].reward + gamma * g;
            if rule.admits(ep, t, |e| e.state) {
                returns[ep[t].state] += g;
                visits[ep[t].state] += 1;
            }
        }
    }

    let mut v = initial_values(env);
    for s in env.non_terminal_states() {
        if visits[s] > 0 {
            v[s] = returns[s] / visits[s] as Continous;
        }
    }
    v
}
