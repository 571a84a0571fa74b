//! Core abstractions.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::Policy;
pub use step::Step;

/// An observation of the environment.
///
/// For the trading environment this is a fixed-length feature vector:
/// z-score of the close window, trend strength of the close window and
/// z-score of the volume window.
#[derive(Clone, Debug, PartialEq)]
pub struct Obs(pub Vec<f32>);

impl Obs {
    /// Returns the number of features.
    pub fn dim(&self) -> usize {
        self.0.len()
    }
}

/// An action of the environment, a single scalar in
/// `[-max_action, max_action]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Act(pub f32);
