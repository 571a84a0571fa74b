//! Trading environment over a market data tape.
use super::{
    features::{log_trend_strength, normalize, trend_strength, zscore_last},
    EnvConfig, MarketData, TrendModel,
};
use crate::{error::TradientError, Act, Env, Obs, Step};
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Percentage change of consecutive elements; the first element is NaN.
fn pct_change(close: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(close.len());
    returns.push(f64::NAN);
    for w in close.windows(2) {
        returns.push(w[1] / w[0] - 1.0);
    }
    returns
}

/// An episodic decision process over one instrument's price/volume tape.
///
/// Every reset rotates to the next symbol of the configured
/// [`MarketData`] and replays its series from the start. An episode ends
/// when fewer than two bars of the series remain ahead of the time
/// index.
///
/// The time index always satisfies `window + 1 <= ts_index < close.len()`
/// between [`reset`](Env::reset) and the terminal step.
pub struct TradingEnv {
    window: usize,
    trend_model: TrendModel,
    max_action: f32,
    data: MarketData,

    // Rotation counter over the symbol list, -1 before the first reset.
    // Random starts draw an inclusive upper bound that wraps to the
    // first symbol.
    count_iter: i64,

    close: Vec<f64>,
    volume: Vec<f64>,
    returns: Vec<f64>,
    ts_index: usize,

    // Raw per-step rewards of the running episode, diagnostics only.
    strat_returns: Vec<f32>,

    rng: StdRng,
}

impl TradingEnv {
    /// Symbol of the running episode.
    pub fn symbol(&self) -> &str {
        &self.data.series[self.count_iter as usize].symbol
    }

    /// Raw rewards accumulated since the last reset, diagnostics only.
    pub fn strategy_returns(&self) -> &[f32] {
        &self.strat_returns
    }

    /// Builds the 3-feature observation from explicit windows.
    ///
    /// Exposed so an execution layer can featurize freshly consolidated
    /// bars outside of an episode. Non-finite features are zeroed.
    pub fn next_observation(&self, close_window: &[f64], volume_window: &[f64]) -> Obs {
        let col = zscore_last(close_window);
        let trend = match self.trend_model {
            TrendModel::Linear => trend_strength(close_window),
            TrendModel::LogLinear => log_trend_strength(close_window),
        };
        let vol = zscore_last(volume_window);

        Obs([col, trend, vol]
            .iter()
            .map(|x| if x.is_finite() { *x as f32 } else { 0.0 })
            .collect())
    }

    /// Maps the magnitude of a raw action onto the trade-size scale.
    pub fn normalize(&self, x: f64) -> f64 {
        normalize(x)
    }

    /// Observation at the current time index.
    fn observe(&self) -> Obs {
        let (c, v) = self.windows();
        self.next_observation(c, v)
    }

    /// Trailing close/volume windows ending just before the time index.
    fn windows(&self) -> (&[f64], &[f64]) {
        let step = self.ts_index;
        (
            &self.close[step - self.window..step],
            &self.volume[step - self.window..step],
        )
    }

    /// Reward of trading `trade` units into the current bar.
    ///
    /// Appends the raw reward to the strategy-return log and coerces a
    /// non-finite reward to 0 at the boundary.
    fn get_reward(&mut self, trade: f64) -> f32 {
        let reward = self.returns[self.ts_index] * trade;
        self.strat_returns.push(reward as f32);
        if reward.is_finite() {
            reward as f32
        } else {
            0.0
        }
    }

    /// Maps a raw action to a bounded trade size.
    fn trade_size(&self, action: f64) -> f64 {
        if action >= 0.05 {
            normalize(action.abs()).clamp(0.0, 1.0)
        } else if action <= -0.05 {
            -normalize(action.abs()).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Env for TradingEnv {
    type Config = EnvConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.data.n_symbols() == 0 {
            return Err(TradientError::EmptyMarketData.into());
        }
        // reset() places ts_index at window + 1 and the reward rule
        // indexes returns[ts_index].
        let min = config.window + 2;
        for s in &config.data.series {
            if s.close.len() < min {
                return Err(TradientError::SeriesTooShort {
                    symbol: s.symbol.clone(),
                    len: s.close.len(),
                    min,
                    window: config.window,
                }
                .into());
            }
        }

        Ok(Self {
            window: config.window,
            trend_model: config.trend_model.clone(),
            max_action: config.max_action,
            data: config.data.clone(),
            count_iter: -1,
            close: vec![],
            volume: vec![],
            returns: vec![],
            ts_index: 0,
            strat_returns: vec![],
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn reset(&mut self, random_start: bool) -> Result<Obs> {
        let n = self.data.n_symbols() as i64;
        if random_start {
            // Inclusive upper bound; the wraparound below maps n to 0.
            self.count_iter = self.rng.gen_range(0..=n);
        }
        if self.count_iter + 1 >= n {
            self.count_iter = -1;
        }
        self.count_iter += 1;

        let series = &self.data.series[self.count_iter as usize];
        self.close = series.close.clone();
        self.volume = series.volume.clone();
        self.returns = pct_change(&self.close);
        self.ts_index = self.window + 1;
        self.strat_returns.clear();

        trace!("reset to symbol {}", self.symbol());
        Ok(self.observe())
    }

    fn step(&mut self, act: &Act) -> Step {
        let size = self.trade_size(act.0 as f64);
        let done = self.ts_index + 2 >= self.close.len();
        let reward = self.get_reward(size);
        if !done {
            self.ts_index += 1;
        }

        Step {
            obs: self.observe(),
            reward,
            is_done: done,
            ts_index: self.ts_index,
        }
    }

    fn max_action(&self) -> f32 {
        self.max_action
    }

    fn n_symbols(&self) -> usize {
        self.data.n_symbols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SymbolSeries;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Three ramp series of distinct slopes.
    fn ramp_data(n_bars: usize) -> MarketData {
        let series = (0..3)
            .map(|k| {
                let scale = (k + 1) as f64;
                SymbolSeries {
                    symbol: format!("RAMP{}", k),
                    close: (1..=n_bars).map(|i| scale * i as f64).collect(),
                    volume: (1..=n_bars).map(|i| 100.0 + i as f64).collect(),
                }
            })
            .collect();
        MarketData::new(series)
    }

    fn env_with(window: usize, n_bars: usize) -> TradingEnv {
        let config = EnvConfig::default()
            .window(window)
            .data(ramp_data(n_bars));
        TradingEnv::build(&config, 0).unwrap()
    }

    #[test]
    fn test_build_rejects_short_series() {
        let config = EnvConfig::default().window(10).data(ramp_data(11));
        assert!(TradingEnv::build(&config, 0).is_err());
    }

    #[test]
    fn test_reset_rotates_symbols() {
        init();
        let mut env = env_with(3, 20);
        let mut symbols = vec![];
        for _ in 0..4 {
            env.reset(false).unwrap();
            symbols.push(env.symbol().to_string());
        }
        assert_eq!(symbols, ["RAMP0", "RAMP1", "RAMP2", "RAMP0"]);
    }

    #[test]
    fn test_random_start_stays_in_range() {
        let mut env = env_with(3, 20);
        for _ in 0..32 {
            env.reset(true).unwrap();
            assert!(env.data.symbols().contains(&env.symbol()));
        }
    }

    #[test]
    fn test_terminal_boundary() {
        // window 3, 8 bars: ts starts at 4; done exactly when
        // ts + 2 >= 8, i.e. on the third step, with ts frozen at 6.
        let mut env = env_with(3, 8);
        env.reset(false).unwrap();

        let s = env.step(&Act(0.0));
        assert!(!s.is_done);
        assert_eq!(s.ts_index, 5);
        let s = env.step(&Act(0.0));
        assert!(!s.is_done);
        assert_eq!(s.ts_index, 6);
        let s = env.step(&Act(0.0));
        assert!(s.is_done);
        assert_eq!(s.ts_index, 6);
    }

    #[test]
    fn test_reward_of_full_long() {
        let mut env = env_with(3, 20);
        env.reset(false).unwrap();

        // normalize(1.0) clips to size 1.0; ramp returns[4] = 5/4 - 1.
        let s = env.step(&Act(1.0));
        assert!((s.reward - 0.25).abs() < 1e-6);
        assert_eq!(env.strategy_returns().len(), 1);
    }

    #[test]
    fn test_reward_of_short_and_flat() {
        let mut env = env_with(3, 20);
        env.reset(false).unwrap();
        let s = env.step(&Act(-1.0));
        assert!((s.reward + 0.25).abs() < 1e-6);

        env.reset(false).unwrap();
        let s = env.step(&Act(0.04));
        assert_eq!(s.reward, 0.0);
        let s = env.step(&Act(-0.04));
        assert_eq!(s.reward, 0.0);
    }

    #[test]
    fn test_flat_series_rewards_are_zeroed() {
        // Flat zero series: pct_change is NaN everywhere, rewards must
        // coerce to 0 and features must be zeroed.
        let config = EnvConfig::default().window(3).data(MarketData::synthetic(1, 10));
        let mut env = TradingEnv::build(&config, 0).unwrap();
        let obs = env.reset(false).unwrap();
        assert_eq!(obs.0, vec![0.0, 0.0, 0.0]);

        let s = env.step(&Act(1.0));
        assert_eq!(s.reward, 0.0);
        // The raw (non-finite) reward is still logged.
        assert_eq!(env.strategy_returns().len(), 1);
        assert!(env.strategy_returns()[0].is_nan());
    }

    #[test]
    fn test_deterministic_replay() {
        let actions = [0.3f32, -0.5, 0.0, 0.9, -0.06, 0.05];
        let run = || {
            let mut env = env_with(4, 16);
            let mut trace = vec![env.reset(false).unwrap().0];
            let mut rewards = vec![];
            for a in &actions {
                let s = env.step(&Act(*a));
                rewards.push(s.reward);
                trace.push(s.obs.0);
            }
            (trace, rewards)
        };
        assert_eq!(run(), run());
    }
}
