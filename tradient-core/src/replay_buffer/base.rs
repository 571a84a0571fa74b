//! Ring-buffer experience store.
use super::{
    snapshot::{self, Snapshot},
    ReplayBufferConfig, Transition, TransitionBatch,
};
use crate::{error::TradientError, store::BlobStore};
use anyhow::Result;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A bounded store of [`Transition`]s with uniform random sampling.
///
/// Appends below capacity; once full, a write cursor wraps modulo the
/// capacity and overwrites the oldest entries.
pub struct ReplayBuffer {
    capacity: usize,
    storage: Vec<Transition>,
    cursor: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Builds an empty buffer.
    pub fn build(config: &ReplayBufferConfig) -> Self {
        Self {
            capacity: config.capacity,
            storage: Vec::new(),
            cursor: 0,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Number of stored transitions, at most the capacity.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the buffer holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Maximum number of stored transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts a transition, overwriting the oldest one once full.
    pub fn push(&mut self, transition: Transition) {
        if self.storage.len() == self.capacity {
            self.storage[self.cursor] = transition;
            self.cursor = (self.cursor + 1) % self.capacity;
        } else {
            self.storage.push(transition);
        }
    }

    /// Draws `batch_size` transitions uniformly at random with
    /// replacement.
    ///
    /// Fails with [`TradientError::InsufficientSamples`] when the buffer
    /// holds fewer transitions than requested; warm the buffer up before
    /// training.
    pub fn batch(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        if batch_size > self.storage.len() {
            return Err(TradientError::InsufficientSamples {
                requested: batch_size,
                len: self.storage.len(),
            }
            .into());
        }

        // A zero-sized batch is within the precondition, also on an
        // empty buffer; there is no first transition to take a dim from.
        let obs_dim = self.storage.first().map_or(0, |t| t.obs.len());
        let mut obs = Vec::with_capacity(batch_size * obs_dim);
        let mut acts = Vec::with_capacity(batch_size);
        let mut next_obs = Vec::with_capacity(batch_size * obs_dim);
        let mut rewards = Vec::with_capacity(batch_size);
        let mut is_done = Vec::with_capacity(batch_size);

        for _ in 0..batch_size {
            let ix = self.rng.gen_range(0..self.storage.len());
            let t = &self.storage[ix];
            obs.extend_from_slice(&t.obs);
            next_obs.extend_from_slice(&t.next_obs);
            acts.push(t.act);
            rewards.push(t.reward);
            is_done.push(t.is_done as u8 as f32);
        }

        Ok(TransitionBatch {
            obs,
            acts,
            next_obs,
            rewards,
            is_done,
            batch_size,
            obs_dim,
        })
    }

    /// Saves the buffer contents under `key` on the given store.
    pub fn save(&self, store: &dyn BlobStore, key: &str) -> Result<()> {
        let snapshot = Snapshot {
            transitions: self.storage.clone(),
            cursor: self.cursor as u64,
        };
        store.save(key, &snapshot::encode(&snapshot)?)?;
        info!("Saved replay buffer ({} transitions) under {}", self.len(), key);
        Ok(())
    }

    /// Restores the buffer contents from `key` on the given store.
    ///
    /// The configured capacity is kept; a snapshot larger than the
    /// capacity is rejected.
    pub fn load(&mut self, store: &dyn BlobStore, key: &str) -> Result<()> {
        let snapshot = snapshot::decode(&store.read(key)?)?;
        if snapshot.transitions.len() > self.capacity {
            return Err(TradientError::SnapshotTooLarge {
                len: snapshot.transitions.len(),
                capacity: self.capacity,
            }
            .into());
        }
        self.storage = snapshot.transitions;
        self.cursor = snapshot.cursor as usize % self.capacity;
        info!("Loaded replay buffer ({} transitions) from {}", self.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsBlobStore;
    use tempdir::TempDir;

    fn transition(tag: f32) -> Transition {
        Transition {
            obs: vec![tag, tag + 0.1, tag + 0.2],
            next_obs: vec![tag + 1.0, tag + 1.1, tag + 1.2],
            act: tag / 10.0,
            reward: tag,
            is_done: false,
        }
    }

    fn buffer(capacity: usize) -> ReplayBuffer {
        ReplayBuffer::build(&ReplayBufferConfig::default().capacity(capacity))
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut buffer = buffer(5);
        for i in 0..8 {
            buffer.push(transition(i as f32));
        }

        assert_eq!(buffer.len(), 5);
        // Slots 0..3 were overwritten in ring order by 5, 6, 7.
        let rewards: Vec<f32> = buffer.storage.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![5.0, 6.0, 7.0, 3.0, 4.0]);
        assert_eq!(buffer.cursor, 3);
    }

    #[test]
    fn test_batch_shapes() {
        let mut buffer = buffer(64);
        for i in 0..40 {
            buffer.push(transition(i as f32));
        }

        let batch = buffer.batch(32).unwrap();
        assert_eq!(batch.batch_size, 32);
        assert_eq!(batch.obs_dim, 3);
        assert_eq!(batch.obs.len(), 32 * 3);
        assert_eq!(batch.next_obs.len(), 32 * 3);
        assert_eq!(batch.acts.len(), 32);
        assert_eq!(batch.rewards.len(), 32);
        assert_eq!(batch.is_done.len(), 32);

        // Rows are consistent: reward identifies the transition.
        for row in 0..32 {
            let r = batch.rewards[row];
            assert_eq!(batch.obs[row * 3], r);
            assert_eq!(batch.acts[row], r / 10.0);
        }
    }

    #[test]
    fn test_empty_batch_from_empty_buffer() {
        let mut buffer = buffer(4);
        let batch = buffer.batch(0).unwrap();
        assert_eq!(batch.batch_size, 0);
        assert_eq!(batch.obs_dim, 0);
        assert!(batch.obs.is_empty());
        assert!(batch.rewards.is_empty());

        buffer.push(transition(1.0));
        let batch = buffer.batch(0).unwrap();
        assert_eq!(batch.batch_size, 0);
        assert_eq!(batch.obs_dim, 3);
        assert!(batch.obs.is_empty());
    }

    #[test]
    fn test_batch_larger_than_len_is_an_error() {
        let mut buffer = buffer(64);
        buffer.push(transition(0.0));
        let err = buffer.batch(2).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TradientError>(),
            Some(TradientError::InsufficientSamples { requested: 2, len: 1 })
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new("replay_buffer").unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        let mut buffer = buffer(4);
        for i in 0..6 {
            buffer.push(transition(i as f32));
        }
        buffer.save(&store, "replay").unwrap();

        let mut restored = ReplayBuffer::build(&ReplayBufferConfig::default().capacity(4));
        restored.load(&store, "replay").unwrap();
        assert_eq!(restored.storage, buffer.storage);
        assert_eq!(restored.cursor, buffer.cursor);
    }

    #[test]
    fn test_load_rejects_oversized_snapshot() {
        let dir = TempDir::new("replay_buffer").unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        let mut big = buffer(8);
        for i in 0..8 {
            big.push(transition(i as f32));
        }
        big.save(&store, "replay").unwrap();

        let mut small = buffer(4);
        assert!(small.load(&store, "replay").is_err());
    }
}
