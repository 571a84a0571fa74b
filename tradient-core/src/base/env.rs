//! Environment.
use super::{Act, Obs, Step};
use anyhow::Result;

/// Represents an episodic decision process over a market data tape.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    ///
    /// The seed drives the random-start symbol selection in
    /// [`Env::reset`]; it has no other effect, the tape itself is
    /// deterministic.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the first observation.
    ///
    /// With `random_start == true` the symbol rotation is reseeded at a
    /// random position before advancing.
    fn reset(&mut self, random_start: bool) -> Result<Obs>;

    /// Performs an environment step.
    fn step(&mut self, act: &Act) -> Step;

    /// Upper bound of the action space, actions live in
    /// `[-max_action, max_action]`.
    fn max_action(&self) -> f32;

    /// Number of symbols in the rotation, i.e. the number of distinct
    /// episodes a full evaluation pass covers.
    fn n_symbols(&self) -> usize;
}
