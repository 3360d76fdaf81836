extern crate gridworld;
extern crate ndarray;
extern crate rand;
extern crate serde;
extern crate serde_json;

pub mod config;
pub mod error;
pub mod mdps;

pub use config::ExperimentConfig;
pub use error::SolverError;
pub use mdps::{
    mdp_simulator::*,
    mdp_solver::*,
    mdp_solver_policy::*,
    solvers::{
        common::{values_from_q, DpConfig, Dynamics},
        mc_methods::*,
        policy_iteration::*,
        q_learning::*,
        value_iteration::*,
    },
};
