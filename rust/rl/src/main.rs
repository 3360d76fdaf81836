use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use gridworld::*;
use itertools::Itertools;
use ndarray::Array2;
use rand::prelude::*;
use rl::*;
use std::{path::PathBuf, rc::Rc};
use tracing::{info, Level};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SolverKind {
    ValueIteration,
    ValueIterationDeterministic,
    PolicyIteration,
    FirstVisitMc,
    NaiveMc,
    QLearning,
}

#[derive(Debug, Parser)]
#[command(name = "rl", about = "Tabular solvers on a slippery grid world", version)]
struct Args {
    /// Experiment JSON; the classic 3x4 grid with default solver settings when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = SolverKind::ValueIteration)]
    solver: SolverKind,

    /// Overrides the seed of the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the discount of every solver.
    #[arg(long)]
    gamma: Option<Continous>,

    /// Verbosity: -v, -vv
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn report(env: &GridWorld, values: &Array2<Continous>, pi: &dyn Policy, rng: &mut StdRng) {
    println!("{}\n", ui::show_values(env, values));

    let policy = TabularPolicy::from_policy(env, pi);
    println!("{}\n", ui::show_policy(env, &policy));

    let path = rollout(env, pi, rng, env.initial(), 100).states();
    println!("{}", path.iter().map(|(r, c)| format!("({r}, {c})")).join(" -> "));
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut cfg = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg = cfg.seed(seed);
    }
    if let Some(gamma) = args.gamma {
        cfg = cfg.gamma(gamma);
    }

    let env = cfg.build_env().context("building the grid world")?;
    let rng = &mut match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(solver = ?args.solver, seed = ?cfg.seed, "solving");

    match args.solver {
        SolverKind::ValueIteration | SolverKind::ValueIterationDeterministic => {
            let mut vi = ValueIteration::new(&env, cfg.dp.clone())?;
            if let SolverKind::ValueIterationDeterministic = args.solver {
                vi = vi.deterministic();
            }
            let convergence = vi.exec();
            println!("{convergence:?}\n");

            let vi = Rc::new(vi);
            let policy = MdpSolverPolicy {
                mdp_solver: vi.clone(),
            };
            report(&env, vi.values(), &policy, rng);
        }
        SolverKind::PolicyIteration => {
            let mut pi = PolicyIteration::new(&env, cfg.dp.clone())?;
            let convergence = pi.exec();
            println!("{convergence:?}\n");

            let pi = Rc::new(pi);
            let policy = MdpSolverPolicy {
                mdp_solver: pi.clone(),
            };
            report(&env, pi.values(), &policy, rng);
        }
        SolverKind::FirstVisitMc => {
            let sol = first_visit_mc(&env, rng, &cfg.mc)?;
            println!("{:?}\n", sol.convergence);
            report(&env, &values_from_q(&env, &sol.q), &sol.policy, rng);
        }
        SolverKind::NaiveMc => {
            let sol = naive_mc(&env, rng, &cfg.naive_mc)?;
            println!("{:?}\n", sol.convergence);
            report(&env, &values_from_q(&env, &sol.q), &sol.policy, rng);
        }
        SolverKind::QLearning => {
            let sol = q_learning(&env, rng, &cfg.q_learning)?;
            println!("epsilon: {}, truncated episodes: {}\n", sol.epsilon, sol.truncated);
            report(&env, &values_from_q(&env, &sol.q), &sol.policy, rng);
        }
    }

    Ok(())
}
