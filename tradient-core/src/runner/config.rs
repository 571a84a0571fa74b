//! Configuration of [`Runner`](super::Runner).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How many gradient iterations the agent runs per environment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateSchedule {
    /// As many iterations as steps elapsed in the current episode, so
    /// update intensity grows within an episode.
    EpisodeProgress,

    /// A fixed number of iterations per step.
    Fixed(usize),
}

/// Configuration of [`Runner`](super::Runner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of training episodes.
    pub n_episodes: usize,

    /// Standard deviation of the exploration noise during training.
    pub explore_noise: f64,

    /// Episodes per evaluation pass; `None` runs one episode per symbol
    /// of the evaluation environment.
    pub eval_episodes: Option<usize>,

    /// Gradient iterations per environment step.
    pub update_schedule: UpdateSchedule,

    /// Where best-model checkpoints are saved; no checkpointing when
    /// `None`.
    pub model_dir: Option<String>,

    /// Seed of the warm-up action RNG.
    pub seed: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            n_episodes: 100,
            explore_noise: 0.1,
            eval_episodes: None,
            update_schedule: UpdateSchedule::EpisodeProgress,
            model_dir: None,
            seed: 42,
        }
    }
}

impl RunnerConfig {
    /// Sets the number of training episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the exploration noise.
    pub fn explore_noise(mut self, v: f64) -> Self {
        self.explore_noise = v;
        self
    }

    /// Sets the number of evaluation episodes.
    pub fn eval_episodes(mut self, v: usize) -> Self {
        self.eval_episodes = Some(v);
        self
    }

    /// Sets the update schedule.
    pub fn update_schedule(mut self, v: UpdateSchedule) -> Self {
        self.update_schedule = v;
        self
    }

    /// Sets the checkpoint directory.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Sets the seed of the warm-up action RNG.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`RunnerConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`RunnerConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
