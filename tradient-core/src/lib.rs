#![warn(missing_docs)]
//! Core components of a reinforcement-learning agent that learns a
//! trading-sizing policy.
//!
//! This crate is backend-free: it defines the trading environment, the
//! replay buffer, the training runner and the capabilities they consume
//! (a blob store for persistence, a recorder for metrics). The function
//! approximators and the TD3 update rule live in `tradient-tch-agent`,
//! which implements the [`Agent`] trait defined here.
pub mod env;
pub mod error;
pub mod record;
pub mod replay_buffer;
pub mod runner;
pub mod store;

mod base;
pub use base::{Act, Agent, Env, Obs, Policy, Step};
