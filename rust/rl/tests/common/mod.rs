use gridworld::*;
use rl::*;

/// Non-terminal cells of the classic grid with a single optimal action when
/// nothing slips. `(2, 0)` is left out: Up and Right tie there.
#[allow(dead_code)]
pub const UNTIED: [State; 8] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 2),
    (2, 1),
    (2, 2),
    (2, 3),
];

#[allow(dead_code)]
pub fn classic(slip_prob: Continous) -> GridWorld {
    GridWorld::classic(slip_prob).unwrap()
}

#[allow(dead_code)]
pub fn per_cell(slip_prob: Continous) -> GridWorld {
    GridWorld::new(
        &GridWorldConfig::default()
            .size(2, 3)
            .initial((1, 0))
            .terminal(vec![(0, 2)])
            .walls(vec![(1, 1)])
            .rewards(RewardSpec::PerCell {
                table: vec![vec![0., 0., 1.], vec![0., 0., 0.]],
            })
            .slip_prob(slip_prob),
    )
    .unwrap()
}

/// Optimal policy of the slip-free classic grid.
#[allow(dead_code)]
pub fn optimal_deterministic() -> TabularPolicy {
    value_iteration_deterministic(&classic(0.), &DpConfig::default())
        .unwrap()
        .policy
}

/// Share of `states` on which both policies pick the same action.
#[allow(dead_code)]
pub fn agreement(a: &TabularPolicy, b: &TabularPolicy, states: &[State]) -> Continous {
    let same = states.iter().filter(|&&s| a.get(s) == b.get(s)).count();
    same as Continous / states.len() as Continous
}
