use crate::errors::{AppError, Result};
use crate::provider::{Quote, VenueFeed, normalize_asset, normalize_venue};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// On-disk snapshot layout: venue -> asset -> price.
type SnapshotFile = BTreeMap<String, BTreeMap<String, f64>>;

/// Reads one venue's section of a JSON price snapshot on every fetch.
///
/// ```json
/// { "kraken": { "BTC": 64000.5, "ETH": 3100.0 }, "lbank": { "BTC": 64100.0 } }
/// ```
///
/// A venue absent from the file yields no quotes rather than an error.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    venue: String,
    path: PathBuf,
}

impl SnapshotFeed {
    pub fn new(venue: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            venue: normalize_venue(venue),
            path: path.into(),
        }
    }
}

#[async_trait]
impl VenueFeed for SnapshotFeed {
    fn venue(&self) -> &str {
        &self.venue
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::Feed {
                venue: self.venue.clone(),
                reason: format!("reading {}: {e}", self.path.display()),
            })?;
        let snapshot: SnapshotFile = serde_json::from_str(&raw)?;

        let quotes: Vec<Quote> = snapshot
            .into_iter()
            .find(|(venue, _)| normalize_venue(venue) == self.venue)
            .map(|(_, prices)| {
                prices
                    .into_iter()
                    .map(|(asset, price)| Quote::new(normalize_asset(&asset), price))
                    .collect()
            })
            .unwrap_or_default();

        debug!(venue = %self.venue, quotes = quotes.len(), "[FEED] snapshot loaded");
        Ok(quotes)
    }
}

/// Fixed in-memory quotes for one venue.
#[derive(Debug, Clone)]
pub struct StaticFeed {
    venue: String,
    quotes: Vec<Quote>,
}

impl StaticFeed {
    pub fn new<I, A>(venue: &str, quotes: I) -> Self
    where
        I: IntoIterator<Item = (A, f64)>,
        A: AsRef<str>,
    {
        Self {
            venue: normalize_venue(venue),
            quotes: quotes
                .into_iter()
                .map(|(asset, price)| Quote::new(normalize_asset(asset.as_ref()), price))
                .collect(),
        }
    }
}

#[async_trait]
impl VenueFeed for StaticFeed {
    fn venue(&self) -> &str {
        &self.venue
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        Ok(self.quotes.clone())
    }
}
