//! Serializable description of a [`GridWorld`](crate::GridWorld).
use crate::{Continous, State};
use serde::{Deserialize, Serialize};

/// How rewards are handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSpec {
    /// `table[row][col]` is earned on entering that cell; blocked moves earn 0.
    PerCell { table: Vec<Vec<Continous>> },

    /// Every move out of a non-terminal state costs `cost`, blocked or not.
    StepCost {
        cost: Continous,
        terminal_rewards: Vec<(State, Continous)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridWorldConfig {
    /// `(height, width)`.
    pub size: (usize, usize),

    pub initial: State,

    pub terminal: Vec<State>,

    pub walls: Vec<State>,

    pub rewards: RewardSpec,

    /// Probability of slipping to each side of the intended move.
    pub slip_prob: Continous,
}

impl Default for GridWorldConfig {
    /// The 3x4 grid with a +1 exit at `(0, 3)`, a -1 pit at `(1, 3)` and a
    /// pillar at `(1, 1)`.
    fn default() -> Self {
        Self {
            size: (3, 4),
            initial: (2, 0),
            terminal: vec![(0, 3), (1, 3)],
            walls: vec![(1, 1)],
            rewards: RewardSpec::StepCost {
                cost: -0.02,
                terminal_rewards: vec![((0, 3), 1.), ((1, 3), -1.)],
            },
            slip_prob: 0.1,
        }
    }
}

impl GridWorldConfig {
    pub fn size(mut self, height: usize, width: usize) -> Self {
        self.size = (height, width);
        self
    }

    pub fn initial(mut self, state: State) -> Self {
        self.initial = state;
        self
    }

    pub fn terminal(mut self, terminal: Vec<State>) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn walls(mut self, walls: Vec<State>) -> Self {
        self.walls = walls;
        self
    }

    pub fn rewards(mut self, rewards: RewardSpec) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn slip_prob(mut self, p: Continous) -> Self {
        self.slip_prob = p;
        self
    }
}
