use super::ActorConfig;
use crate::{
    mlp::{mlp, MlpConfig},
    model::ModelBase,
    opt::{Optimizer, OptimizerConfig},
};
use anyhow::Result;
use log::{info, trace};
use std::path::Path;
use tch::{nn, nn::Module, Device, Tensor};

/// Deterministic policy network of TD3 agents.
///
/// A tanh on the output layer bounds the action to `[-max_action,
/// max_action]`.
pub struct Actor {
    device: Device,
    var_store: nn::VarStore,
    net_config: MlpConfig,
    pi: nn::Sequential,
    max_action: f64,
    opt_config: OptimizerConfig,
    opt: Optimizer,
}

impl Actor {
    /// Constructs [Actor].
    pub fn build(config: ActorConfig, device: Device) -> Result<Actor> {
        let var_store = nn::VarStore::new(device);
        let pi = Self::network(&var_store, &config.net_config, config.max_action);
        let opt = config.opt_config.build(&var_store)?;

        Ok(Self {
            device,
            var_store,
            net_config: config.net_config,
            pi,
            max_action: config.max_action,
            opt_config: config.opt_config,
            opt,
        })
    }

    fn network(var_store: &nn::VarStore, config: &MlpConfig, max_action: f64) -> nn::Sequential {
        let out_dim = config.out_dim;
        let in_dim = *config.units.last().unwrap_or(&config.in_dim);
        let p = &var_store.root();

        mlp("pi_l", var_store, config)
            .add(nn::linear(p / "pi_out", in_dim, out_dim, Default::default()))
            .add_fn(move |x| max_action * x.tanh())
    }

    /// Outputs a bounded action given a batch of observations.
    pub fn forward(&self, obs: &Tensor) -> Tensor {
        self.pi.forward(obs)
    }

    /// Bound of the action.
    pub fn max_action(&self) -> f64 {
        self.max_action
    }

    /// Device holding the parameters.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl Clone for Actor {
    fn clone(&self) -> Self {
        let device = self.device;
        let mut var_store = nn::VarStore::new(device);
        let pi = Self::network(&var_store, &self.net_config, self.max_action);
        let opt = self.opt_config.build(&var_store).unwrap();
        var_store.copy(&self.var_store).unwrap();

        Self {
            device,
            var_store,
            net_config: self.net_config.clone(),
            pi,
            max_action: self.max_action,
            opt_config: self.opt_config.clone(),
            opt,
        }
    }
}

impl ModelBase for Actor {
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
        info!("Save actor to {:?}", path.as_ref());
        let vs = self.var_store.variables();
        for (name, _) in vs.iter() {
            trace!("Save variable {}", name);
        }
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Load actor from {:?}", path.as_ref());
        Ok(())
    }
}
