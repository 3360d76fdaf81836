extern crate float_eq;
extern crate gridworld;
extern crate rl;
extern crate rstest;
mod common;

use common::*;
use float_eq::*;
use gridworld::*;
use rand::prelude::*;
use rl::*;
use rstest::*;

const SEEDS: [u64; 3] = [11, 23, 42];

#[test]
fn first_visit_mc_finds_the_slip_free_optimum() {
    let env = classic(0.);
    let optimum = optimal_deterministic();
    let cfg = McConfig::default().max_iter(20_000).stable_iters(usize::MAX);

    for seed in SEEDS {
        let sol = first_visit_mc(&env, &mut StdRng::seed_from_u64(seed), &cfg).unwrap();

        assert_eq!(sol.convergence.iterations, 20_000);
        assert_eq!(agreement(&sol.policy, &optimum, &UNTIED), 1., "seed {seed}");
    }
}

#[test]
fn naive_mc_finds_the_slip_free_optimum() {
    let env = classic(0.);
    let optimum = optimal_deterministic();
    let cfg = NaiveMcConfig::default().samples(2);

    for seed in SEEDS {
        let sol = naive_mc(&env, &mut StdRng::seed_from_u64(seed), &cfg).unwrap();

        assert!(sol.convergence.converged);
        assert_eq!(agreement(&sol.policy, &optimum, &UNTIED), 1., "seed {seed}");
    }
}

#[test]
fn q_learning_finds_the_slip_free_optimum() {
    let env = classic(0.);
    let optimum = optimal_deterministic();
    let cfg = QLearningConfig::default()
        .alpha(0.5)
        .epsilon(0.3, 0.3, 1.)
        .episodes(3000);

    for seed in SEEDS {
        let sol = q_learning(&env, &mut StdRng::seed_from_u64(seed), &cfg).unwrap();

        assert_eq!(sol.truncated, 0);
        assert_eq!(agreement(&sol.policy, &optimum, &UNTIED), 1., "seed {seed}");

        let v = values_from_q(&env, &sol.q);
        assert_float_eq!(v[(0, 2)], 0.88, abs <= 0.05);
        assert_eq!(v[(0, 3)], 1.);
    }
}

#[rstest]
fn q_learning_stops_at_the_target(#[values(1, 2)] seed: u64) {
    let env = classic(0.1);
    let cfg = QLearningConfig::default()
        .episodes(50)
        .initial_state((2, 0))
        .target_state((2, 1))
        .epsilon(1., 1., 1.);
    let sol = q_learning(&env, &mut StdRng::seed_from_u64(seed), &cfg).unwrap();

    // Episodes end on arrival, so the target's own row is never updated.
    for s in [(2, 1), (0, 3), (1, 3)] {
        for a in Action::ALL {
            assert_eq!(sol.q[[a.index(), s.0, s.1]], 0., "{s:?} {a}");
        }
    }
    assert!(Action::ALL.iter().any(|a| sol.q[[a.index(), 2, 0]] != 0.));
}

#[test]
fn seeded_runs_repeat() {
    let env = classic(0.1);
    let mc = McConfig::default().max_iter(200);
    let ql = QLearningConfig::default().episodes(50);

    assert_eq!(
        first_visit_mc(&env, &mut StdRng::seed_from_u64(5), &mc).unwrap(),
        first_visit_mc(&env, &mut StdRng::seed_from_u64(5), &mc).unwrap()
    );
    assert_eq!(
        q_learning(&env, &mut StdRng::seed_from_u64(5), &ql).unwrap(),
        q_learning(&env, &mut StdRng::seed_from_u64(5), &ql).unwrap()
    );
}
