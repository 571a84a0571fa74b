//! Configuration of [`TradingEnv`](super::TradingEnv).
use super::MarketData;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Which regression the trend-strength feature is computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrendModel {
    /// Ordinary linear regression of the close window.
    Linear,

    /// Linear regression of the log of the close window.
    LogLinear,
}

/// Configuration of [`TradingEnv`](super::TradingEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Length of the observation window in bars.
    pub window: usize,

    /// Regression flavor of the trend-strength feature.
    pub trend_model: TrendModel,

    /// Upper bound of the action space.
    pub max_action: f32,

    /// The market data tape the environment walks.
    pub data: MarketData,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            window: 10,
            trend_model: TrendModel::Linear,
            max_action: 1.0,
            data: MarketData::synthetic(3, 100),
        }
    }
}

impl EnvConfig {
    /// Sets the observation window length.
    pub fn window(mut self, v: usize) -> Self {
        self.window = v;
        self
    }

    /// Sets the trend-strength regression flavor.
    pub fn trend_model(mut self, v: TrendModel) -> Self {
        self.trend_model = v;
        self
    }

    /// Sets the upper bound of the action space.
    pub fn max_action(mut self, v: f32) -> Self {
        self.max_action = v;
        self
    }

    /// Sets the market data tape.
    pub fn data(mut self, v: MarketData) -> Self {
        self.data = v;
        self
    }

    /// Constructs [`EnvConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`EnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
