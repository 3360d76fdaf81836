use crate::*;
use itertools::{iproduct, Itertools};
use ndarray::Array2;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

/// Reward structure consumed by [`GridWorld::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum RewardModel {
    /// Reward for entering a cell. Blocked moves earn 0.
    PerCell(Array2<Continous>),

    /// Flat cost for every move out of a non-terminal state, blocked moves
    /// included. Terminal rewards are kept separately.
    StepCost {
        cost: Continous,
        terminal: HashMap<State, Continous>,
    },
}

impl RewardModel {
    fn moved(&self, next: State) -> Continous {
        match self {
            RewardModel::PerCell(table) => table[next],
            RewardModel::StepCost { cost, .. } => *cost,
        }
    }

    fn blocked(&self) -> Continous {
        match self {
            RewardModel::PerCell(_) => 0.,
            RewardModel::StepCost { cost, .. } => *cost,
        }
    }

    fn terminal(&self, s: State) -> Option<Continous> {
        match self {
            RewardModel::PerCell(table) => table.get(s).copied(),
            RewardModel::StepCost { terminal, .. } => terminal.get(&s).copied(),
        }
    }
}

/// Rectangular grid with walls, terminal cells and slippery moves.
///
/// Immutable once built; solvers only read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridWorld {
    height: usize,
    width: usize,
    initial: State,
    terminal: BTreeSet<State>,
    walls: BTreeSet<State>,
    rewards: RewardModel,
    slip_prob: Continous,
}

impl GridWorld {
    pub fn new(cfg: &GridWorldConfig) -> Result<Self, GridWorldError> {
        let (height, width) = cfg.size;
        if height == 0 || width == 0 {
            return Err(GridWorldError::EmptyGrid { height, width });
        }

        let check_bounds = |kind: &'static str, state: State| {
            if state.0 < height && state.1 < width {
                Ok(())
            } else {
                Err(GridWorldError::OutOfBounds {
                    kind,
                    state,
                    height,
                    width,
                })
            }
        };

        let walls = cfg.walls.iter().copied().collect::<BTreeSet<_>>();
        for &w in &walls {
            check_bounds("wall", w)?;
        }

        let terminal = cfg.terminal.iter().copied().collect::<BTreeSet<_>>();
        for &t in &terminal {
            check_bounds("terminal", t)?;
            if walls.contains(&t) {
                return Err(GridWorldError::OnWall {
                    kind: "terminal",
                    state: t,
                });
            }
        }

        check_bounds("initial", cfg.initial)?;
        if walls.contains(&cfg.initial) {
            return Err(GridWorldError::OnWall {
                kind: "initial",
                state: cfg.initial,
            });
        }

        if !(0.0..0.5).contains(&cfg.slip_prob) {
            return Err(GridWorldError::SlipProbability(cfg.slip_prob));
        }

        let rewards = match &cfg.rewards {
            RewardSpec::PerCell { table } => {
                let rows = table.len();
                let cols = table.first().map_or(0, Vec::len);
                if rows != height || table.iter().any(|r| r.len() != width) {
                    return Err(GridWorldError::RewardShape {
                        rows,
                        cols,
                        height,
                        width,
                    });
                }

                RewardModel::PerCell(Array2::from_shape_fn((height, width), |(r, c)| {
                    table[r][c]
                }))
            }
            RewardSpec::StepCost {
                cost,
                terminal_rewards,
            } => {
                if let Some(s) = terminal_rewards.iter().map(|&(s, _)| s).duplicates().next() {
                    return Err(GridWorldError::DuplicateTerminalReward(s));
                }
                let map = terminal_rewards.iter().copied().collect::<HashMap<_, _>>();
                if let Some(&(s, _)) = terminal_rewards
                    .iter()
                    .find(|(s, _)| !terminal.contains(s))
                {
                    return Err(GridWorldError::UnexpectedTerminalReward(s));
                }
                if let Some(&t) = terminal.iter().find(|&t| !map.contains_key(t)) {
                    return Err(GridWorldError::MissingTerminalReward(t));
                }

                RewardModel::StepCost {
                    cost: *cost,
                    terminal: map,
                }
            }
        };

        Ok(Self {
            height,
            width,
            initial: cfg.initial,
            terminal,
            walls,
            rewards,
            slip_prob: cfg.slip_prob,
        })
    }

    /// The 3x4 grid: +1 at `(0, 3)`, -1 at `(1, 3)`, wall at `(1, 1)`, step
    /// cost -0.02.
    pub fn classic(slip_prob: Continous) -> Result<Self, GridWorldError> {
        Self::new(&GridWorldConfig::default().slip_prob(slip_prob))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn initial(&self) -> State {
        self.initial
    }

    pub fn terminals(&self) -> &BTreeSet<State> {
        &self.terminal
    }

    pub fn walls(&self) -> &BTreeSet<State> {
        &self.walls
    }

    pub fn rewards(&self) -> &RewardModel {
        &self.rewards
    }

    pub fn slip_prob(&self) -> Continous {
        self.slip_prob
    }

    pub fn in_bounds(&self, s: State) -> bool {
        s.0 < self.height && s.1 < self.width
    }

    pub fn is_wall(&self, s: State) -> bool {
        self.walls.contains(&s)
    }

    pub fn is_terminal(&self, s: State) -> bool {
        self.terminal.contains(&s)
    }

    /// Fixed value of a terminal state, `None` for every other state.
    pub fn terminal_reward(&self, s: State) -> Option<Continous> {
        if self.is_terminal(s) {
            self.rewards.terminal(s)
        } else {
            None
        }
    }

    /// Deterministic kinematics. Leaving the grid or walking into a wall
    /// leaves the agent where it was.
    pub fn step(&self, state: State, action: Action) -> (State, Continous) {
        if self.is_terminal(state) {
            return (state, 0.);
        }

        let (dr, dc) = action.displacement();
        let next = match (
            state.0.checked_add_signed(dr),
            state.1.checked_add_signed(dc),
        ) {
            (Some(r), Some(c)) => Some((r, c)),
            _ => None,
        };

        match next {
            Some(next) if self.in_bounds(next) && !self.is_wall(next) => {
                (next, self.rewards.moved(next))
            }
            _ => (state, self.rewards.blocked()),
        }
    }

    /// Outcomes of the intended move and its two perpendicular slips. A
    /// slip-free grid yields the single intended outcome.
    pub fn transition_probs(&self, state: State, action: Action) -> Vec<Transition> {
        let p = self.slip_prob;
        let intended = std::iter::once((action, 1. - 2. * p));
        let slips = action.perpendicular().into_iter().map(|a| (a, p));

        intended
            .chain(slips)
            .filter(|&(_, probability)| probability > 0.)
            .map(|(a, probability)| {
                let (next_state, reward) = self.step(state, a);
                Transition {
                    probability,
                    next_state,
                    reward,
                }
            })
            .collect()
    }

    /// One draw from [`Self::transition_probs`].
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        state: State,
        action: Action,
    ) -> (State, Continous) {
        pick_next(rng, &self.transition_probs(state, action))
            .unwrap_or_else(|| self.step(state, action))
    }

    /// Every non-wall cell in row-major order.
    pub fn valid_states(&self) -> Vec<State> {
        iproduct!(0..self.height, 0..self.width)
            .filter(|&s| !self.is_wall(s))
            .collect()
    }

    pub fn non_terminal_states(&self) -> Vec<State> {
        self.valid_states()
            .into_iter()
            .filter(|&s| !self.is_terminal(s))
            .collect()
    }
}

impl TryFrom<&GridWorldConfig> for GridWorld {
    type Error = GridWorldError;

    fn try_from(cfg: &GridWorldConfig) -> Result<Self, Self::Error> {
        Self::new(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;

    fn per_cell() -> GridWorld {
        let cfg = GridWorldConfig::default()
            .size(2, 3)
            .initial((1, 0))
            .terminal(vec![(0, 2)])
            .walls(vec![(1, 1)])
            .rewards(RewardSpec::PerCell {
                table: vec![vec![-1., -1., 10.], vec![-1., 0., -1.]],
            })
            .slip_prob(0.);
        GridWorld::new(&cfg).unwrap()
    }

    #[test]
    fn per_cell_blocked_move_is_free() {
        let env = per_cell();
        assert_eq!(env.step((1, 0), Action::Down), ((1, 0), 0.));
        assert_eq!(env.step((1, 0), Action::Right), ((1, 0), 0.));
        assert_eq!(env.step((1, 0), Action::Up), ((0, 0), -1.));
        assert_eq!(env.step((0, 1), Action::Right), ((0, 2), 10.));
        assert_eq!(env.terminal_reward((0, 2)), Some(10.));
    }

    #[test]
    fn step_cost_blocked_move_still_costs() {
        let env = GridWorld::classic(0.).unwrap();
        assert_eq!(env.step((0, 0), Action::Up), ((0, 0), -0.02));
        assert_eq!(env.step((1, 0), Action::Right), ((1, 0), -0.02));
        assert_eq!(env.step((0, 2), Action::Right), ((0, 3), -0.02));
        assert_eq!(env.terminal_reward((0, 3)), Some(1.));
        assert_eq!(env.terminal_reward((1, 3)), Some(-1.));
        assert_eq!(env.terminal_reward((0, 2)), None);
    }

    #[test]
    fn slip_outcomes_are_perpendicular() {
        let env = GridWorld::classic(0.1).unwrap();
        let ts = env.transition_probs((2, 2), Action::Up);

        assert_eq!(ts.len(), 3);
        assert_eq!(ts[0].next_state, (1, 2));
        assert_float_eq!(ts[0].probability, 0.8, abs <= 1e-12);
        assert_eq!(ts[1].next_state, (2, 3));
        assert_eq!(ts[2].next_state, (2, 1));
        assert_float_eq!(ts[1].probability, 0.1, abs <= 1e-12);
        assert_float_eq!(ts[2].probability, 0.1, abs <= 1e-12);
    }

    #[test]
    fn valid_states_skip_walls_in_row_major_order() {
        let env = per_cell();
        assert_eq!(
            env.valid_states(),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 2)]
        );
        assert_eq!(
            env.non_terminal_states(),
            vec![(0, 0), (0, 1), (1, 0), (1, 2)]
        );
    }
}
