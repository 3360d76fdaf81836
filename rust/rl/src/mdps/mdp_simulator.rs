use gridworld::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// How the next action of an episode is picked from the policy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exploration {
    /// Always the policy's action.
    #[default]
    Greedy,

    /// The policy's action with probability `1 - e + e/|A|`, any other with `e/|A|`.
    EpsilonSoft(Continous),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub events: Vec<EpisodeEvent>,
    pub final_state: State,
}

impl Episode {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn states(&self) -> Vec<State> {
        self.events
            .iter()
            .map(|e| e.state)
            .chain(std::iter::once(self.final_state))
            .collect()
    }
}

pub trait EpisodeGenerator {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Episode>;
}

struct ActionWeight {
    action: Action,
    p: Continous,
}

impl Weighted<Action> for ActionWeight {
    fn s(&self) -> Action {
        self.action
    }

    fn p(&self) -> Continous {
        self.p
    }
}

pub fn epsilon_greedy<R: Rng + ?Sized>(rng: &mut R, greedy: Action, epsilon: Continous) -> Action {
    let n = N_ACTIONS as Continous;
    let weights = Action::ALL.map(|action| ActionWeight {
        action,
        p: if action == greedy {
            1. - epsilon + epsilon / n
        } else {
            epsilon / n
        },
    });

    pick_next(rng, &weights).unwrap_or(greedy)
}

/// Starts with `(state, action)` and then follows `pi`, until a terminal
/// state or `length` steps.
pub fn generate_episode<R: Rng + ?Sized>(
    env: &GridWorld,
    rng: &mut R,
    state: State,
    action: Action,
    pi: &dyn Policy,
    length: usize,
    exploration: Exploration,
) -> Episode {
    let mut events = Vec::with_capacity(length);
    let (mut state, mut action) = (state, action);
    for _ in 0..length {
        if env.is_terminal(state) {
            break;
        }

        let (next, reward) = env.sample(rng, state, action);
        events.push(EpisodeEvent {
            state,
            action,
            reward,
        });
        state = next;

        let Some(greedy) = pi.policy(&state) else {
            break;
        };
        action = match exploration {
            Exploration::Greedy => greedy,
            Exploration::EpsilonSoft(epsilon) => epsilon_greedy(rng, greedy, epsilon),
        };
    }

    Episode {
        events,
        final_state: state,
    }
}

/// Follows `pi` from `start`.
pub fn rollout<R: Rng + ?Sized>(
    env: &GridWorld,
    pi: &dyn Policy,
    rng: &mut R,
    start: State,
    max_steps: usize,
) -> Episode {
    match pi.policy(&start) {
        Some(action) => generate_episode(env, rng, start, action, pi, max_steps, Exploration::Greedy),
        None => Episode {
            events: vec![],
            final_state: start,
        },
    }
}

/// Rewards folded back to front. An episode that ended in a terminal state
/// starts the fold from that state's reward.
pub fn discounted_return(env: &GridWorld, episode: &Episode, gamma: Continous) -> Continous {
    let g = env.terminal_reward(episode.final_state).unwrap_or(0.);
    episode
        .events
        .iter()
        .rev()
        .fold(g, |g, e| e.reward + gamma * g)
}

/// Episodes of a fixed policy, each from a uniformly drawn non-terminal state.
pub struct PolicyRollouts<'a> {
    pub env: &'a GridWorld,
    pub policy: TabularPolicy,
    pub length: usize,
}

impl EpisodeGenerator for PolicyRollouts<'_> {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Episode> {
        let rng = &mut match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let starts = self.env.non_terminal_states();
        (0..n)
            .filter_map(|_| {
                let &s = starts.choose(rng)?;
                Some(rollout(self.env, &self.policy, rng, s, self.length))
            })
            .collect()
    }
}
