//! Core library for the arbitrage-scanner project.
//!
//! The detection engine (`arbitrage`) is a pure, per-scan pipeline over an
//! immutable `PriceTable`; feeds and the aggregator live outside it and only
//! hand it finished snapshots.

pub mod aggregator;
pub mod arbitrage;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod utils;
