//! Agent.
use super::Policy;
use crate::{record::Record, replay_buffer::ReplayBuffer};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy.
pub trait Agent: Policy {
    /// Performs `iterations` optimization steps against transitions
    /// sampled from `buffer`.
    ///
    /// Returns a [`Record`] with training diagnostics, typically losses.
    /// Fails if the buffer holds fewer transitions than the agent's
    /// batch size; the caller is expected to warm the buffer up first.
    fn opt(&mut self, buffer: &mut ReplayBuffer, iterations: usize) -> Result<Record>;

    /// Saves the parameters of the agent in the given directory.
    ///
    /// Creates one artifact per network, e.g. the TD3 agent in
    /// `tradient-tch-agent` writes the online actor and critic.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
