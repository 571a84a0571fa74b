//! Configuration of TD3 agent.
use crate::{mlp::MlpConfig, opt::OptimizerConfig};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [Actor](super::Actor).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ActorConfig {
    pub(super) net_config: MlpConfig,
    pub(super) max_action: f64,
    pub(super) opt_config: OptimizerConfig,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            net_config: MlpConfig::new(3, vec![400, 300], 1),
            max_action: 1.0,
            opt_config: OptimizerConfig::Adam { lr: 1e-3 },
        }
    }
}

impl ActorConfig {
    /// Network architecture.
    pub fn net_config(mut self, v: MlpConfig) -> Self {
        self.net_config = v;
        self
    }

    /// Bound of the action, applied after the tanh squashing.
    pub fn max_action(mut self, v: f64) -> Self {
        self.max_action = v;
        self
    }

    /// Optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Configuration of [Critic](super::Critic).
///
/// `net_config.in_dim` counts both the observation and the action
/// features; `net_config.out_dim` is ignored, each head emits a scalar.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CriticConfig {
    pub(super) net_config: MlpConfig,
    pub(super) opt_config: OptimizerConfig,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            net_config: MlpConfig::new(4, vec![400, 300], 1),
            opt_config: OptimizerConfig::Adam { lr: 1e-3 },
        }
    }
}

impl CriticConfig {
    /// Network architecture.
    pub fn net_config(mut self, v: MlpConfig) -> Self {
        self.net_config = v;
        self
    }

    /// Optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Constructs [Td3](super::Td3).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Td3Config {
    pub(super) actor_config: ActorConfig,
    pub(super) critic_config: CriticConfig,
    pub(super) gamma: f64,
    pub(super) tau: f64,
    pub(super) policy_noise: f64,
    pub(super) noise_clip: f64,
    pub(super) policy_freq: usize,
    pub(super) batch_size: usize,
    pub(super) seed: Option<i64>,
}

impl Default for Td3Config {
    fn default() -> Self {
        Self {
            actor_config: Default::default(),
            critic_config: Default::default(),
            gamma: 0.99,
            tau: 0.005,
            policy_noise: 0.2,
            noise_clip: 0.5,
            policy_freq: 2,
            batch_size: 100,
            seed: None,
        }
    }
}

impl Td3Config {
    /// Configuration of actor.
    pub fn actor_config(mut self, v: ActorConfig) -> Self {
        self.actor_config = v;
        self
    }

    /// Configuration of critic.
    pub fn critic_config(mut self, v: CriticConfig) -> Self {
        self.critic_config = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Soft update coefficient.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Standard deviation of the target policy smoothing noise.
    pub fn policy_noise(mut self, v: f64) -> Self {
        self.policy_noise = v;
        self
    }

    /// Bound of the target policy smoothing noise.
    pub fn noise_clip(mut self, v: f64) -> Self {
        self.noise_clip = v;
        self
    }

    /// Number of critic updates per delayed policy update.
    pub fn policy_freq(mut self, v: usize) -> Self {
        self.policy_freq = v;
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Random seed of the torch generator.
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Constructs [Td3Config] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of TD3 agent from {}", path_.to_string_lossy());
        Ok(b)
    }

    /// Saves [Td3Config].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of TD3 agent into {}", path_.to_string_lossy());
        Ok(())
    }
}
