//! Trading environment.
//!
//! [`TradingEnv`] simulates one instrument's price/volume tape at a time
//! as an episodic decision process. Each [`reset`](crate::Env::reset)
//! rotates to the next symbol of the configured [`MarketData`], each
//! [`step`](crate::Env::step) maps the agent's raw action to a bounded
//! trade size and pays the next bar's percentage return scaled by that
//! size.
mod base;
mod config;
mod data;
pub mod features;
pub use base::TradingEnv;
pub use config::{EnvConfig, TrendModel};
pub use data::{HistoryProvider, MarketData, SymbolSeries};
