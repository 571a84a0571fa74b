//! TD3 agent.
mod actor;
mod base;
mod config;
mod critic;
pub use actor::Actor;
pub use base::Td3;
pub use config::{ActorConfig, CriticConfig, Td3Config};
pub use critic::Critic;
