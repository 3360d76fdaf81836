use crate::*;
use ndarray::Array2;
use rand::Rng;

pub trait Policy {
    fn policy(&self, s: &State) -> Option<Action>;
}

/// Deterministic policy stored per cell. Terminal cells and walls hold `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularPolicy {
    actions: Array2<Option<Action>>,
}

impl TabularPolicy {
    pub fn empty(env: &GridWorld) -> Self {
        Self {
            actions: Array2::from_elem(env.shape(), None),
        }
    }

    /// Same action in every non-terminal state.
    pub fn uniform(env: &GridWorld, action: Action) -> Self {
        let mut pi = Self::empty(env);
        for s in env.non_terminal_states() {
            pi.set(s, action);
        }
        pi
    }

    pub fn random<R: Rng + ?Sized>(env: &GridWorld, rng: &mut R) -> Self {
        let mut pi = Self::empty(env);
        for s in env.non_terminal_states() {
            pi.set(s, Action::ALL[rng.gen_range(0..N_ACTIONS)]);
        }
        pi
    }

    /// Tabulates any policy over the non-terminal states.
    pub fn from_policy(env: &GridWorld, pi: &dyn Policy) -> Self {
        let mut tab = Self::empty(env);
        for s in env.non_terminal_states() {
            if let Some(a) = pi.policy(&s) {
                tab.set(s, a);
            }
        }
        tab
    }

    pub fn get(&self, s: State) -> Option<Action> {
        self.actions.get(s).copied().flatten()
    }

    pub fn set(&mut self, s: State, a: Action) {
        if let Some(slot) = self.actions.get_mut(s) {
            *slot = Some(a);
        }
    }
}

impl Policy for TabularPolicy {
    fn policy(&self, s: &State) -> Option<Action> {
        self.get(*s)
    }
}
