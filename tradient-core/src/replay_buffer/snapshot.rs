//! Versioned binary encoding of replay buffer contents.
//!
//! A snapshot is a fixed header (magic + format version) followed by a
//! bincode payload; loading parses, never executes.
use super::Transition;
use crate::error::TradientError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

const MAGIC: [u8; 4] = *b"TRDB";
const VERSION: u32 = 1;

/// Replay buffer contents as stored on a blob store.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Snapshot {
    /// Stored transitions, in ring order.
    pub transitions: Vec<Transition>,

    /// Write cursor of the ring.
    pub cursor: u64,
}

pub(super) fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend(bincode::serialize(snapshot)?);
    Ok(buf)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Snapshot> {
    if bytes.len() < 8 || bytes[..4] != MAGIC {
        return Err(TradientError::SnapshotHeader.into());
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != VERSION {
        return Err(TradientError::SnapshotVersion(version).into());
    }
    Ok(bincode::deserialize(&bytes[8..])?)
}
