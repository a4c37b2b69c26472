//! Arbitrage detection: enumerate cycles, simulate them with fees, keep the
//! profitable ones and render them for consumers.

pub mod engine;
pub mod enumerator;
pub mod filter;
pub mod format;
pub mod simulator;

pub use engine::{ArbitrageEngine, ScanOutcome};
pub use enumerator::{Partition, Universe};
pub use filter::{OpportunityFilter, is_canonical, rank};
pub use format::{OpportunityRecord, ScanReport, describe};
pub use simulator::{SimulatedTrade, simulate};
