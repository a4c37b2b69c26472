//! Price feeds.
//!
//! Responsibilities:
//! • Fetch the latest quotes a single venue publishes.
//! • Retry failed fetches with exponential backoff and jitter.
//!
//! The detection engine never talks to feeds; the aggregator turns their
//! output into a `PriceTable` first.

use crate::errors::Result;
use crate::models::{Asset, Venue};
use async_trait::async_trait;

pub mod retry;
pub mod snapshot;

pub use retry::{RetryPolicy, fetch_with_retry};
pub use snapshot::{SnapshotFeed, StaticFeed};

/// Last traded price of one asset on one venue.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub asset: Asset,
    pub price: f64,
}

impl Quote {
    pub fn new(asset: impl Into<Asset>, price: f64) -> Self {
        Self {
            asset: asset.into(),
            price,
        }
    }
}

/// Source of quotes for a single venue.
#[async_trait]
pub trait VenueFeed: Send + Sync {
    fn venue(&self) -> &str;

    async fn fetch_quotes(&self) -> Result<Vec<Quote>>;
}

/// Lower-cased venue id, as used for table keys.
pub fn normalize_venue(venue: &str) -> Venue {
    venue.trim().to_lowercase()
}

/// Upper-cased asset symbol, as used for table keys.
pub fn normalize_asset(asset: &str) -> Asset {
    asset.trim().to_uppercase()
}
