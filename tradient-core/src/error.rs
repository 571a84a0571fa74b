//! Errors in the core crate.
use thiserror::Error;

/// Errors raised by the core components.
#[derive(Debug, Error)]
pub enum TradientError {
    /// Requested more samples than the replay buffer holds.
    #[error("batch size {requested} exceeds replay buffer length {len}")]
    InsufficientSamples {
        /// Requested batch size.
        requested: usize,
        /// Current buffer length.
        len: usize,
    },

    /// A replay buffer snapshot did not start with the expected magic.
    #[error("replay buffer snapshot has an invalid header")]
    SnapshotHeader,

    /// A replay buffer snapshot was written by an unknown format version.
    #[error("unsupported replay buffer snapshot version {0}")]
    SnapshotVersion(u32),

    /// A snapshot holds more transitions than the buffer's capacity.
    #[error("snapshot holds {len} transitions, buffer capacity is {capacity}")]
    SnapshotTooLarge {
        /// Number of transitions in the snapshot.
        len: usize,
        /// Capacity of the receiving buffer.
        capacity: usize,
    },

    /// A symbol's series is too short for the configured window.
    #[error("series of {symbol} has {len} bars, need at least {min} for window {window}")]
    SeriesTooShort {
        /// Symbol whose series is too short.
        symbol: String,
        /// Number of bars in the series.
        len: usize,
        /// Minimum number of bars required.
        min: usize,
        /// Configured observation window.
        window: usize,
    },

    /// The market data holds no symbols.
    #[error("market data holds no symbols")]
    EmptyMarketData,
}
