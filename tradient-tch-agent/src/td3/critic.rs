use super::CriticConfig;
use crate::{
    mlp::{mlp, MlpConfig},
    model::ModelBase,
    opt::{Optimizer, OptimizerConfig},
};
use anyhow::Result;
use log::{info, trace};
use std::path::Path;
use tch::{nn, nn::Module, Device, Tensor};

/// Twin action-value network of TD3 agents.
///
/// Both heads take the concatenation of an observation and an action
/// and emit a scalar value. They share an optimizer but no layers, so
/// a single backward step trains both.
pub struct Critic {
    device: Device,
    var_store: nn::VarStore,
    net_config: MlpConfig,
    q1: nn::Sequential,
    q2: nn::Sequential,
    opt_config: OptimizerConfig,
    opt: Optimizer,
}

impl Critic {
    /// Constructs [Critic].
    pub fn build(config: CriticConfig, device: Device) -> Result<Critic> {
        let var_store = nn::VarStore::new(device);
        let q1 = Self::head(&var_store, &config.net_config, "q1");
        let q2 = Self::head(&var_store, &config.net_config, "q2");
        let opt = config.opt_config.build(&var_store)?;

        Ok(Self {
            device,
            var_store,
            net_config: config.net_config,
            q1,
            q2,
            opt_config: config.opt_config,
            opt,
        })
    }

    fn head(var_store: &nn::VarStore, config: &MlpConfig, prefix: &str) -> nn::Sequential {
        let in_dim = *config.units.last().unwrap_or(&config.in_dim);
        let p = &var_store.root();

        mlp(&format!("{}_l", prefix), var_store, config).add(nn::linear(
            p / format!("{}_out", prefix),
            in_dim,
            1,
            Default::default(),
        ))
    }

    /// Action values of both heads, each of shape `[batch_size, 1]`.
    pub fn forward(&self, obs: &Tensor, act: &Tensor) -> (Tensor, Tensor) {
        let x = Tensor::cat(&[obs, act], 1);
        (self.q1.forward(&x), self.q2.forward(&x))
    }

    /// Action value of the first head only, used for the policy loss.
    pub fn q1(&self, obs: &Tensor, act: &Tensor) -> Tensor {
        let x = Tensor::cat(&[obs, act], 1);
        self.q1.forward(&x)
    }

    /// Device holding the parameters.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl Clone for Critic {
    fn clone(&self) -> Self {
        let device = self.device;
        let mut var_store = nn::VarStore::new(device);
        let q1 = Self::head(&var_store, &self.net_config, "q1");
        let q2 = Self::head(&var_store, &self.net_config, "q2");
        let opt = self.opt_config.build(&var_store).unwrap();
        var_store.copy(&self.var_store).unwrap();

        Self {
            device,
            var_store,
            net_config: self.net_config.clone(),
            q1,
            q2,
            opt_config: self.opt_config.clone(),
            opt,
        }
    }
}

impl ModelBase for Critic {
    fn backward_step(&mut self, loss: &Tensor) {
        self.opt.backward_step(loss);
    }

    fn get_var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn get_var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.var_store
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Save critic to {:?}", path.as_ref());
        let vs = self.var_store.variables();
        for (name, _) in vs.iter() {
            trace!("Save variable {}", name);
        }
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Load critic from {:?}", path.as_ref());
        Ok(())
    }
}
