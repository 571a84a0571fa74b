//! Policy.
use super::{Act, Obs};

/// A policy on an environment, mapping an observation to an action.
pub trait Policy {
    /// Selects an action given an observation.
    ///
    /// If `noise` is non-zero, a Gaussian perturbation with standard
    /// deviation `noise` is added to the action before it is clipped to
    /// the action bounds.
    fn select_action(&mut self, obs: &Obs, noise: f64) -> Act;
}
