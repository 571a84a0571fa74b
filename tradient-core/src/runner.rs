//! Training runner.
//!
//! Drives the environment/agent/buffer loop: warm-up collection with
//! random actions, episodic training with exploration noise, periodic
//! zero-noise evaluation and best-model checkpointing.
mod config;
pub use config::{RunnerConfig, UpdateSchedule};

use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition},
    Act, Agent, Env, Obs,
};
use anyhow::Result;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;
use std::path::Path;

// Trailing window over episode scores reported to the recorder.
const SCORE_WINDOW: usize = 25;

/// Orchestrates warm-up, training episodes, evaluation and
/// checkpointing. Owns the replay buffer; environments and the agent are
/// passed into each phase.
pub struct Runner {
    config: RunnerConfig,
    buffer: ReplayBuffer,
    rng: StdRng,
}

impl Runner {
    /// Builds a runner with an empty replay buffer.
    pub fn build(config: RunnerConfig, buffer_config: &ReplayBufferConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            buffer: ReplayBuffer::build(buffer_config),
            rng,
        }
    }

    /// The replay buffer.
    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    /// The replay buffer, mutable (e.g. to restore a snapshot before
    /// training).
    pub fn buffer_mut(&mut self) -> &mut ReplayBuffer {
        &mut self.buffer
    }

    fn transition(obs: &Obs, next_obs: &Obs, act: Act, reward: f32, is_done: bool) -> Transition {
        Transition {
            obs: obs.0.clone(),
            next_obs: next_obs.0.clone(),
            act: act.0,
            reward,
            is_done,
        }
    }

    /// Warm-up phase: takes `n_steps` uniformly random actions in `env`,
    /// pushing every transition into the buffer and resetting the
    /// environment on terminal, without any learning update.
    pub fn observe<E: Env>(&mut self, env: &mut E, n_steps: usize) -> Result<()> {
        let max_action = env.max_action();
        let mut obs = env.reset(false)?;

        for _ in 0..n_steps {
            let act = Act(self.rng.gen_range(-max_action..=max_action));
            let step = env.step(&act);
            self.buffer
                .push(Self::transition(&obs, &step.obs, act, step.reward, step.is_done));
            obs = step.obs;
            if step.is_done {
                obs = env.reset(false)?;
            }
        }

        info!(
            "Collected {} warm-up transitions, buffer length {}",
            n_steps,
            self.buffer.len()
        );
        Ok(())
    }

    /// Runs the policy without exploration noise for `episodes` full
    /// episodes and returns the average of the summed rewards.
    ///
    /// Used for model selection only; no transition is stored.
    pub fn evaluate<E: Env, A: Agent>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        episodes: usize,
    ) -> Result<f32> {
        let mut avg_reward = 0f32;

        for _ in 0..episodes {
            let mut obs = env.reset(false)?;
            loop {
                let act = agent.select_action(&obs, 0.0);
                let step = env.step(&act);
                avg_reward += step.reward;
                if step.is_done {
                    break;
                }
                obs = step.obs;
            }
        }

        Ok(avg_reward / episodes as f32)
    }

    /// Trains `agent` on `train_env` for the configured number of
    /// episodes, evaluating on `eval_env` after every episode and
    /// checkpointing whenever the evaluation reward strictly exceeds the
    /// best seen so far.
    ///
    /// The number of gradient iterations per environment step follows
    /// the configured [`UpdateSchedule`]. Warm the buffer up with
    /// [`Runner::observe`] first; the agent fails its optimization step
    /// on a buffer smaller than its batch size.
    pub fn train<E: Env, A: Agent>(
        &mut self,
        train_env: &mut E,
        eval_env: &mut E,
        agent: &mut A,
        recorder: &mut dyn Recorder,
    ) -> Result<()> {
        let eval_episodes = self
            .config
            .eval_episodes
            .unwrap_or_else(|| eval_env.n_symbols());
        let mut eval_reward_best = f32::MIN;
        let mut score_window: VecDeque<f32> = VecDeque::with_capacity(SCORE_WINDOW);

        info!("Training for {} episodes", self.config.n_episodes);

        // Score the untouched (possibly reloaded) policy first, so a
        // fresh run never clobbers a better previous checkpoint.
        let eval_reward = self.evaluate(eval_env, agent, eval_episodes)?;
        if eval_reward > eval_reward_best {
            eval_reward_best = eval_reward;
            info!("Initial model | {}", eval_reward_best);
            self.save_best(agent)?;
        }

        for episode in 1..=self.config.n_episodes {
            let mut obs = train_env.reset(false)?;
            let mut score = 0f32;
            let mut episode_timesteps = 0;
            let mut agent_record = Record::empty();

            loop {
                let act = agent.select_action(&obs, self.config.explore_noise);
                let step = train_env.step(&act);
                self.buffer
                    .push(Self::transition(&obs, &step.obs, act, step.reward, step.is_done));
                obs = step.obs;
                score += step.reward;
                episode_timesteps += 1;

                let iterations = match self.config.update_schedule {
                    UpdateSchedule::EpisodeProgress => episode_timesteps,
                    UpdateSchedule::Fixed(n) => n,
                };
                agent_record = agent.opt(&mut self.buffer, iterations)?;

                if step.is_done {
                    break;
                }
            }

            if score_window.len() == SCORE_WINDOW {
                score_window.pop_front();
            }
            score_window.push_back(score);
            let score_avg = score_window.iter().sum::<f32>() / score_window.len() as f32;

            let eval_reward = self.evaluate(eval_env, agent, eval_episodes)?;
            if eval_reward > eval_reward_best {
                eval_reward_best = eval_reward;
                info!("{} | Best model | {}", episode, eval_reward_best);
                self.save_best(agent)?;
            }

            let mut record = Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("episode_timesteps", Scalar(episode_timesteps as f32)),
                ("score", Scalar(score)),
                ("score_avg", Scalar(score_avg)),
                ("eval_reward", Scalar(eval_reward)),
            ]);
            record.merge_inplace(agent_record);
            recorder.write(record);
        }

        Ok(())
    }

    fn save_best<A: Agent>(&self, agent: &A) -> Result<()> {
        if let Some(model_dir) = &self.config.model_dir {
            let path = Path::new(model_dir).join("best");
            match agent.save_params(&path) {
                Ok(()) => info!("Saved the model in {:?}", path),
                Err(e) => info!("Failed to save model in {:?}: {}", path, e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvConfig, MarketData, SymbolSeries, TradingEnv};
    use std::path::PathBuf;
    use tempdir::TempDir;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ramp_data() -> MarketData {
        let series = (0..2)
            .map(|k| SymbolSeries {
                symbol: format!("S{}", k),
                close: (1..=30).map(|i| (k + 1) as f64 * i as f64).collect(),
                volume: (1..=30).map(|i| 10.0 + i as f64).collect(),
            })
            .collect();
        MarketData::new(series)
    }

    fn env() -> TradingEnv {
        let config = EnvConfig::default().window(4).data(ramp_data());
        TradingEnv::build(&config, 1).unwrap()
    }

    /// Constant-action agent counting its optimization calls.
    struct StubAgent {
        action: f32,
        opt_iterations: Vec<usize>,
        saved_to: std::cell::RefCell<Vec<PathBuf>>,
    }

    impl StubAgent {
        fn new(action: f32) -> Self {
            Self {
                action,
                opt_iterations: vec![],
                saved_to: std::cell::RefCell::new(vec![]),
            }
        }
    }

    impl crate::Policy for StubAgent {
        fn select_action(&mut self, _obs: &Obs, _noise: f64) -> Act {
            Act(self.action)
        }
    }

    impl Agent for StubAgent {
        fn opt(&mut self, _buffer: &mut ReplayBuffer, iterations: usize) -> Result<Record> {
            self.opt_iterations.push(iterations);
            Ok(Record::from_scalar("loss_critic", 0.0))
        }

        fn save_params(&self, path: &Path) -> Result<()> {
            self.saved_to.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn load_params(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn runner(capacity: usize) -> Runner {
        Runner::build(
            RunnerConfig::default().n_episodes(2),
            &ReplayBufferConfig::default().capacity(capacity),
        )
    }

    #[test]
    fn test_observe_fills_buffer() {
        init();
        let mut runner = runner(2000);
        let mut env = env();
        runner.observe(&mut env, 1000).unwrap();
        assert_eq!(runner.buffer().len(), 1000);
        assert!(runner.buffer_mut().batch(32).is_ok());
    }

    #[test]
    fn test_observe_respects_capacity() {
        let mut runner = runner(100);
        let mut env = env();
        runner.observe(&mut env, 250).unwrap();
        assert_eq!(runner.buffer().len(), 100);
    }

    #[test]
    fn test_evaluate_flat_policy_is_zero() {
        let mut runner = runner(100);
        let mut env = env();
        let mut agent = StubAgent::new(0.0);
        let avg = runner.evaluate(&mut env, &mut agent, 2).unwrap();
        assert_eq!(avg, 0.0);
    }

    #[test]
    fn test_evaluate_long_policy_on_uptrend_is_positive() {
        let mut runner = runner(100);
        let mut env = env();
        let mut agent = StubAgent::new(1.0);
        let avg = runner.evaluate(&mut env, &mut agent, 2).unwrap();
        assert!(avg > 0.0);
    }

    #[test]
    fn test_train_update_schedule_grows_within_episode() {
        init();
        let mut runner = Runner::build(
            RunnerConfig::default().n_episodes(1),
            &ReplayBufferConfig::default().capacity(1000),
        );
        let mut train_env = env();
        let mut eval_env = env();
        let mut agent = StubAgent::new(0.5);
        let mut recorder = crate::record::NullRecorder {};

        runner
            .train(&mut train_env, &mut eval_env, &mut agent, &mut recorder)
            .unwrap();

        // window 4, 30 bars: steps execute at ts 5..=28 with the last
        // one terminal, i.e. 24 steps; iterations grow 1, 2, .., 24.
        let expected: Vec<usize> = (1..=24).collect();
        assert_eq!(agent.opt_iterations, expected);
    }

    #[test]
    fn test_train_fixed_update_schedule() {
        let mut runner = Runner::build(
            RunnerConfig::default()
                .n_episodes(1)
                .update_schedule(UpdateSchedule::Fixed(3)),
            &ReplayBufferConfig::default().capacity(1000),
        );
        let mut train_env = env();
        let mut eval_env = env();
        let mut agent = StubAgent::new(0.5);
        let mut recorder = crate::record::NullRecorder {};

        runner
            .train(&mut train_env, &mut eval_env, &mut agent, &mut recorder)
            .unwrap();
        assert!(agent.opt_iterations.iter().all(|&n| n == 3));
    }

    #[test]
    fn test_train_checkpoints_best_model() {
        let dir = TempDir::new("runner").unwrap();
        let model_dir = dir.path().to_str().unwrap().to_string();
        let mut runner = Runner::build(
            RunnerConfig::default().n_episodes(1).model_dir(model_dir),
            &ReplayBufferConfig::default().capacity(1000),
        );
        let mut train_env = env();
        let mut eval_env = env();
        let mut agent = StubAgent::new(1.0);
        let mut recorder = crate::record::NullRecorder {};

        runner
            .train(&mut train_env, &mut eval_env, &mut agent, &mut recorder)
            .unwrap();

        // Initial checkpoint; the follow-up evaluation of the constant
        // policy ties and a tie must not re-save.
        let saved = agent.saved_to.borrow();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].ends_with("best"));
    }
}
