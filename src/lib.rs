//! # Replay Stats
//!
//! A statistics engine over per-player, per-match replay records.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (records, accumulators, ranking entries, highlight blocks)
//! - **normalize**: Raw heterogeneous rows → typed match records
//! - **calculate**: Aggregation, win rates with Wilson lower bounds, leaderboards
//! - **highlights**: Three-card "notable performance" selection
//! - **compare**: Year-over-year comparison and change leaderboards
//! - **storage**: JSONL input and JSON report output for the CLI
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod compare;
pub mod config;
pub mod highlights;
pub mod models;
pub mod normalize;
pub mod storage;

pub use models::*;
