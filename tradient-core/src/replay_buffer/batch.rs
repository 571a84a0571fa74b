//! Transitions and minibatches.
use serde::{Deserialize, Serialize};

/// One interaction step `(obs, next_obs, act, reward, is_done)`.
///
/// Immutable once pushed into the buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation before the action.
    pub obs: Vec<f32>,

    /// Observation after the action.
    pub next_obs: Vec<f32>,

    /// Applied action.
    pub act: f32,

    /// Reward of the action.
    pub reward: f32,

    /// Whether the episode terminated with this step.
    pub is_done: bool,
}

/// A minibatch of transitions as five parallel column-major arrays.
///
/// `obs` and `next_obs` are flattened `[batch_size, obs_dim]` matrices;
/// `acts`, `rewards` and `is_done` are column vectors `[batch_size, 1]`.
/// Rows keep the order in which sample indices were drawn.
#[derive(Debug)]
pub struct TransitionBatch {
    /// Flattened observations.
    pub obs: Vec<f32>,

    /// Actions.
    pub acts: Vec<f32>,

    /// Flattened next observations.
    pub next_obs: Vec<f32>,

    /// Rewards.
    pub rewards: Vec<f32>,

    /// Terminal flags as 0/1.
    pub is_done: Vec<f32>,

    /// Number of rows.
    pub batch_size: usize,

    /// Number of observation features per row.
    pub obs_dim: usize,
}
