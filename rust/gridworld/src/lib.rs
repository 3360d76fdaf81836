extern crate itertools;
extern crate ndarray;
extern crate rand;
extern crate serde;

pub mod action;
pub mod common;
pub mod config;
pub mod env;
pub mod error;
pub mod policy;
pub mod ui;

pub use action::{Action, N_ACTIONS};
pub use common::{defs::*, utils::*};
pub use config::{GridWorldConfig, RewardSpec};
pub use env::{GridWorld, RewardModel};
pub use error::GridWorldError;
pub use policy::{Policy, TabularPolicy};
