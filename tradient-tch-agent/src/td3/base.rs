use super::{Actor, Critic, Td3Config};
use crate::{model::ModelBase, util::track};
use anyhow::Result;
use log::{info, trace};
use std::convert::TryFrom;
use std::path::Path;
use tch::{no_grad, Device, Tensor};
use tradient_core::{
    record::{Record, RecordValue},
    replay_buffer::{ReplayBuffer, TransitionBatch},
    Act, Agent, Obs, Policy,
};

/// Computes `reward + (1 - is_done) * gamma * next_q` elementwise.
fn bellman_target(reward: &Tensor, is_done: &Tensor, next_q: &Tensor, gamma: f64) -> Tensor {
    reward + (1f32 - is_done) * gamma * next_q
}

/// TD3 agent.
///
/// Holds online and target copies of the actor and the twin critic.
/// Targets start as clones of the online networks and track them with
/// Polyak averaging on every delayed policy update.
pub struct Td3 {
    actor: Actor,
    actor_tgt: Actor,
    critic: Critic,
    critic_tgt: Critic,
    gamma: f64,
    tau: f64,
    policy_noise: f64,
    noise_clip: f64,
    policy_freq: usize,
    batch_size: usize,
    device: Device,
    n_opts: usize,
}

impl Td3 {
    /// Constructs [Td3].
    ///
    /// When the configuration carries a seed, the torch random
    /// generator is seeded before any parameter is initialized, making
    /// weights and every noise draw reproducible.
    pub fn build(config: Td3Config, device: Device) -> Result<Td3> {
        if let Some(seed) = config.seed {
            tch::manual_seed(seed);
        }

        let actor = Actor::build(config.actor_config, device)?;
        let critic = Critic::build(config.critic_config, device)?;
        let actor_tgt = actor.clone();
        let critic_tgt = critic.clone();

        Ok(Self {
            actor,
            actor_tgt,
            critic,
            critic_tgt,
            gamma: config.gamma,
            tau: config.tau,
            policy_noise: config.policy_noise,
            noise_clip: config.noise_clip,
            policy_freq: config.policy_freq,
            batch_size: config.batch_size,
            device,
            n_opts: 0,
        })
    }

    /// Total number of optimization steps performed so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    fn batch_tensors(&self, batch: &TransitionBatch) -> (Tensor, Tensor, Tensor, Tensor, Tensor) {
        let n = batch.batch_size as i64;
        let d = batch.obs_dim as i64;
        let obs = Tensor::from_slice(&batch.obs)
            .reshape(&[n, d])
            .to(self.device);
        let act = Tensor::from_slice(&batch.acts)
            .reshape(&[n, 1])
            .to(self.device);
        let next_obs = Tensor::from_slice(&batch.next_obs)
            .reshape(&[n, d])
            .to(self.device);
        let reward = Tensor::from_slice(&batch.rewards).to(self.device);
        let is_done = Tensor::from_slice(&batch.is_done).to(self.device);
        (obs, act, next_obs, reward, is_done)
    }

    /// Smoothed target action and the clipped double-Q target.
    fn critic_target(&self, next_obs: &Tensor, reward: &Tensor, is_done: &Tensor) -> Tensor {
        no_grad(|| {
            let max_action = self.actor.max_action();
            let noise = (self.policy_noise
                * Tensor::randn(&next_obs.size()[..1], tch::kind::FLOAT_CPU)
                    .unsqueeze(-1)
                    .to(self.device))
            .clip(-self.noise_clip, self.noise_clip);
            let next_act = (self.actor_tgt.forward(next_obs) + noise).clip(-max_action, max_action);

            let (q1, q2) = self.critic_tgt.forward(next_obs, &next_act);
            let next_q = Tensor::vstack(&[q1.squeeze(), q2.squeeze()])
                .min_dim(0, false)
                .0;

            bellman_target(reward, is_done, &next_q, self.gamma)
        })
    }

    fn update_critic(&mut self, tensors: &(Tensor, Tensor, Tensor, Tensor, Tensor)) -> f32 {
        let (obs, act, next_obs, reward, is_done) = tensors;
        let tgt = self.critic_target(next_obs, reward, is_done);

        let (q1, q2) = self.critic.forward(obs, act);
        let loss = q1.squeeze().mse_loss(&tgt, tch::Reduction::Mean)
            + q2.squeeze().mse_loss(&tgt, tch::Reduction::Mean);
        self.critic.backward_step(&loss);

        f32::try_from(&loss).unwrap()
    }

    fn update_actor(&mut self, obs: &Tensor) -> f32 {
        let loss = -self
            .critic
            .q1(obs, &self.actor.forward(obs))
            .mean(tch::Kind::Float);
        self.actor.backward_step(&loss);

        f32::try_from(&loss).unwrap()
    }

    fn soft_update(&mut self) {
        track(&mut self.critic_tgt, &mut self.critic, self.tau);
        track(&mut self.actor_tgt, &mut self.actor, self.tau);
    }
}

impl Policy for Td3 {
    fn select_action(&mut self, obs: &Obs, noise: f64) -> Act {
        let obs = Tensor::from_slice(&obs.0)
            .reshape(&[1, obs.dim() as i64])
            .to(self.device);

        let act = no_grad(|| {
            let max_action = self.actor.max_action();
            let mut act = self.actor.forward(&obs);
            if noise != 0.0 {
                let eps = noise * Tensor::randn(&[1, 1], tch::kind::FLOAT_CPU).to(self.device);
                act = (act + eps).clip(-max_action, max_action);
            }
            act
        });

        Act(act.double_value(&[0, 0]) as f32)
    }
}

impl Agent for Td3 {
    fn opt(&mut self, buffer: &mut ReplayBuffer, iterations: usize) -> Result<Record> {
        let mut loss_critic = 0f32;
        let mut loss_actor = 0f32;
        let mut n_actor_opts = 0;

        for it in 0..iterations {
            let batch = buffer.batch(self.batch_size)?;
            let tensors = self.batch_tensors(&batch);

            loss_critic += self.update_critic(&tensors);

            // delayed policy update, including the first iteration
            if it % self.policy_freq == 0 {
                loss_actor += self.update_actor(&tensors.0);
                self.soft_update();
                n_actor_opts += 1;
            }

            self.n_opts += 1;
        }
        trace!("TD3 ran {} optimization steps", iterations);

        if iterations == 0 {
            return Ok(Record::empty());
        }

        Ok(Record::from_slice(&[
            (
                "loss_critic",
                RecordValue::Scalar(loss_critic / iterations as f32),
            ),
            (
                "loss_actor",
                RecordValue::Scalar(loss_actor / n_actor_opts as f32),
            ),
        ]))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;
        self.actor.save(path.join("actor.pt"))?;
        self.critic.save(path.join("critic.pt"))?;
        info!("Save TD3 agent parameters in {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.actor.load(path.join("actor.pt"))?;
        self.critic.load(path.join("critic.pt"))?;
        // targets restart from the loaded online networks
        self.actor_tgt = self.actor.clone();
        self.critic_tgt = self.critic.clone();
        info!("Load TD3 agent parameters from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;
    use crate::{
        mlp::MlpConfig,
        td3::{ActorConfig, CriticConfig},
    };
    use tempdir::TempDir;
    use tradient_core::replay_buffer::{ReplayBufferConfig, Transition};

    fn config() -> Td3Config {
        Td3Config::default()
            .actor_config(ActorConfig::default().net_config(MlpConfig::new(3, vec![16, 16], 1)))
            .critic_config(CriticConfig::default().net_config(MlpConfig::new(4, vec![16, 16], 1)))
            .batch_size(8)
            .seed(42)
    }

    fn filled_buffer(n: usize) -> ReplayBuffer {
        let mut buffer = ReplayBuffer::build(&ReplayBufferConfig::default().capacity(256));
        for i in 0..n {
            let x = (i % 10) as f32 / 10.0;
            buffer.push(Transition {
                obs: vec![x, -x, 0.5],
                next_obs: vec![-x, x, 0.5],
                act: x - 0.5,
                reward: x,
                is_done: i % 17 == 0,
            });
        }
        buffer
    }

    #[test]
    fn test_bellman_target() {
        let reward = Tensor::from_slice(&[1.0f32, 1.0]);
        let is_done = Tensor::from_slice(&[0.0f32, 1.0]);
        let next_q = Tensor::from_slice(&[2.0f32, 2.0]);

        let tgt = bellman_target(&reward, &is_done, &next_q, 0.99);
        let tgt = Vec::<f32>::try_from(&tgt).unwrap();
        assert!((tgt[0] - 2.98).abs() < 1e-6);
        assert!((tgt[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_select_action_is_bounded() -> Result<()> {
        let mut agent = Td3::build(config(), Device::Cpu)?;
        let obs = Obs(vec![0.1, -0.4, 1.3]);

        for _ in 0..50 {
            let Act(a) = agent.select_action(&obs, 0.3);
            assert!(a.abs() <= 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_negative_noise_still_perturbs() -> Result<()> {
        let obs = Obs(vec![0.1, -0.4, 1.3]);
        let mut a = Td3::build(config(), Device::Cpu)?;
        let mut b = Td3::build(config(), Device::Cpu)?;

        // Any non-zero std perturbs; its sign only flips the draw.
        let deterministic = a.select_action(&obs, 0.0).0;
        let Act(noisy) = b.select_action(&obs, -0.5);
        assert_ne!(noisy, deterministic);
        assert!(noisy.abs() <= 1.0);
        Ok(())
    }

    #[test]
    fn test_seeded_agents_agree() -> Result<()> {
        let obs = Obs(vec![0.1, -0.4, 1.3]);
        let mut a = Td3::build(config(), Device::Cpu)?;
        let mut b = Td3::build(config(), Device::Cpu)?;

        assert_eq!(a.select_action(&obs, 0.0).0, b.select_action(&obs, 0.0).0);
        Ok(())
    }

    #[test]
    fn test_opt_reports_losses() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut agent = Td3::build(config(), Device::Cpu)?;
        let mut buffer = filled_buffer(64);

        let record = agent.opt(&mut buffer, 5)?;
        assert!(record.get_scalar("loss_critic").is_some());
        assert!(record.get_scalar("loss_actor").is_some());
        assert_eq!(agent.n_opts(), 5);

        let record = agent.opt(&mut buffer, 0)?;
        assert!(record.is_empty());
        assert_eq!(agent.n_opts(), 5);
        Ok(())
    }

    #[test]
    fn test_opt_requires_enough_transitions() -> Result<()> {
        let mut agent = Td3::build(config(), Device::Cpu)?;
        let mut buffer = filled_buffer(4);

        assert!(agent.opt(&mut buffer, 1).is_err());
        Ok(())
    }

    #[test]
    fn test_save_load_params() -> Result<()> {
        let dir = TempDir::new("td3_params")?;
        let obs = Obs(vec![0.1, -0.4, 1.3]);

        let mut agent = Td3::build(config(), Device::Cpu)?;
        let mut buffer = filled_buffer(64);
        agent.opt(&mut buffer, 3)?;
        agent.save_params(dir.path())?;
        let expected = agent.select_action(&obs, 0.0).0;

        let mut restored = Td3::build(config().seed(7), Device::Cpu)?;
        restored.load_params(dir.path())?;
        assert_eq!(restored.select_action(&obs, 0.0).0, expected);
        Ok(())
    }
}
