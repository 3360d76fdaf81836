use gridworld::*;

/// 2x3 grid with a +1 cell at `(0, 2)` and a wall in the middle of the bottom row.
#[allow(dead_code)]
pub fn per_cell_config(slip_prob: Continous) -> GridWorldConfig {
    GridWorldConfig::default()
        .size(2, 3)
        .initial((1, 0))
        .terminal(vec![(0, 2)])
        .walls(vec![(1, 1)])
        .rewards(RewardSpec::PerCell {
            table: vec![vec![0., 0., 1.], vec![0., 0., 0.]],
        })
        .slip_prob(slip_prob)
}

#[allow(dead_code)]
pub fn per_cell(slip_prob: Continous) -> GridWorld {
    GridWorld::new(&per_cell_config(slip_prob)).unwrap()
}

#[allow(dead_code)]
pub fn classic(slip_prob: Continous) -> GridWorld {
    GridWorld::classic(slip_prob).unwrap()
}
