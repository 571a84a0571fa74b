//! Replay buffer.
//!
//! A bounded store of interaction history with uniform with-replacement
//! sampling. Once the buffer is full, a ring cursor overwrites the
//! oldest entries. Snapshots of the contents can be saved to and loaded
//! from a [`BlobStore`](crate::store::BlobStore) in a versioned binary
//! encoding.
mod base;
mod batch;
mod config;
mod snapshot;
pub use base::ReplayBuffer;
pub use batch::{Transition, TransitionBatch};
pub use config::ReplayBufferConfig;
