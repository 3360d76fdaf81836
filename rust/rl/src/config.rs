//! A whole run in one JSON file: the grid plus the settings of every solver.
use crate::{
    error::SolverError,
    mdps::solvers::{
        common::DpConfig,
        mc_methods::{McConfig, NaiveMcConfig},
        q_learning::QLearningConfig,
    },
};
use anyhow::Context;
use gridworld::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Seed of the run's RNG, fresh entropy when unset.
    pub seed: Option<u64>,

    pub env: GridWorldConfig,

    pub dp: DpConfig,

    /// Runs far longer than a bare [`McConfig::default`] when the section is
    /// omitted. A section that is present starts from `McConfig::default`.
    pub mc: McConfig,

    pub naive_mc: NaiveMcConfig,

    pub q_learning: QLearningConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            env: GridWorldConfig::default(),
            dp: DpConfig::default(),
            mc: McConfig::default().max_iter(20_000).stable_iters(1_000),
            naive_mc: NaiveMcConfig::default(),
            q_learning: QLearningConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading experiment config {}", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("parsing experiment config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("writing experiment config {}", path.display()))?;
        Ok(())
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same discount for every solver.
    pub fn gamma(mut self, gamma: Continous) -> Self {
        self.dp.gamma = gamma;
        self.mc.gamma = gamma;
        self.naive_mc.gamma = gamma;
        self.q_learning.gamma = gamma;
        self
    }

    pub fn build_env(&self) -> Result<GridWorld, SolverError> {
        Ok(GridWorld::new(&self.env)?)
    }
}
