#![warn(missing_docs)]
//! TD3 agent implemented with [tch](https://crates.io/crates/tch).
//!
//! The twin-delayed deep deterministic policy gradient extends a
//! vanilla actor-critic with clipped double-Q learning against the
//! minimum of two critic heads, Gaussian smoothing of the target
//! policy's action, and policy updates delayed to every few critic
//! updates, each followed by Polyak tracking of the targets.
pub mod mlp;
pub mod model;
pub mod opt;
pub mod td3;
pub mod util;
