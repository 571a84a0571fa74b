//! Market data consumed by the environment.
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Aligned close/volume series of a single symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    /// Symbol name.
    pub symbol: String,

    /// Daily closing prices.
    pub close: Vec<f64>,

    /// Daily volumes, aligned with `close`.
    pub volume: Vec<f64>,
}

/// A set of symbols with aligned close/volume series.
///
/// This is the unit a [`HistoryProvider`] returns and the environment
/// consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Per-symbol series, in rotation order.
    pub series: Vec<SymbolSeries>,
}

impl MarketData {
    /// Constructs market data from per-symbol series.
    pub fn new(series: Vec<SymbolSeries>) -> Self {
        Self { series }
    }

    /// Number of symbols.
    pub fn n_symbols(&self) -> usize {
        self.series.len()
    }

    /// Symbol names in rotation order.
    pub fn symbols(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.symbol.as_str()).collect()
    }

    /// A synthetic frame of `n_symbols` flat series of `n_bars` bars,
    /// used when no real data is supplied (smoke runs and tests).
    pub fn synthetic(n_symbols: usize, n_bars: usize) -> Self {
        let series = (0..n_symbols)
            .map(|i| SymbolSeries {
                symbol: format!("symbol_{}", i + 1),
                close: vec![0.0; n_bars],
                volume: vec![0.0; n_bars],
            })
            .collect();
        Self { series }
    }
}

/// The historical-data collaborator.
///
/// Implemented by the host trading platform; the core only consumes the
/// returned [`MarketData`] when building environments.
pub trait HistoryProvider {
    /// Returns aligned close/volume series for the given symbols over
    /// the last `lookback` bars.
    fn history(&self, symbols: &[String], lookback: usize) -> Result<MarketData>;
}
