//! Environment step.
use super::Obs;

/// The result of one environment step: the next observation, the reward
/// of the applied action and the terminal flag.
///
/// `ts_index` is the time index into the current symbol's series after
/// the step; it is not advanced on the terminal step.
#[derive(Clone, Debug)]
pub struct Step {
    /// Observation after the step.
    pub obs: Obs,

    /// Reward of the applied action.
    pub reward: f32,

    /// Flag denoting if the episode is terminated.
    pub is_done: bool,

    /// Time index into the series.
    pub ts_index: usize,
}
