//! Shared data structures used throughout the application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque asset identifier (e.g. "BTC").
pub type Asset = String;
/// Opaque trading venue identifier (e.g. "kraken").
pub type Venue = String;

/// Immutable snapshot of asset prices across venues for one scan instant.
///
/// A missing venue entry means the price is unavailable, never zero. The
/// table is built once (from quotes or a nested map) and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    prices: BTreeMap<Asset, BTreeMap<Venue, f64>>,
}

impl PriceTable {
    pub fn price(&self, asset: &str, venue: &str) -> Option<f64> {
        self.prices.get(asset)?.get(venue).copied()
    }

    /// Assets in ascending order.
    pub fn assets(&self) -> impl Iterator<Item = &str> + '_ {
        self.prices.keys().map(String::as_str)
    }

    pub fn venues_for(&self, asset: &str) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.prices
            .get(asset)
            .into_iter()
            .flat_map(|m| m.iter().map(|(v, p)| (v.as_str(), *p)))
    }

    pub fn asset_count(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.values().all(BTreeMap::is_empty)
    }
}

impl<A, V> FromIterator<(A, V, f64)> for PriceTable
where
    A: Into<Asset>,
    V: Into<Venue>,
{
    /// Later quotes for the same (asset, venue) overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (A, V, f64)>>(iter: I) -> Self {
        let mut prices: BTreeMap<Asset, BTreeMap<Venue, f64>> = BTreeMap::new();
        for (asset, venue, price) in iter {
            prices
                .entry(asset.into())
                .or_default()
                .insert(venue.into(), price);
        }
        Self { prices }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityKind {
    Direct,
    Triangular,
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityKind::Direct => f.write_str("direct"),
            OpportunityKind::Triangular => f.write_str("triangular"),
        }
    }
}

/// A cycle read from the price table, not yet simulated.
///
/// Borrows its identifiers from the `PriceTable` it was enumerated from, so it
/// cannot outlive the scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Candidate<'a> {
    Direct {
        asset: &'a str,
        buy_venue: &'a str,
        sell_venue: &'a str,
        buy_price: f64,
        sell_price: f64,
    },
    Triangular {
        assets: [&'a str; 3],
        venues: [&'a str; 3],
        prices: [f64; 3],
    },
}

impl<'a> Candidate<'a> {
    pub fn kind(&self) -> OpportunityKind {
        match self {
            Candidate::Direct { .. } => OpportunityKind::Direct,
            Candidate::Triangular { .. } => OpportunityKind::Triangular,
        }
    }

    pub fn assets(&self) -> Vec<&'a str> {
        match self {
            Candidate::Direct { asset, .. } => vec![*asset],
            Candidate::Triangular { assets, .. } => assets.to_vec(),
        }
    }

    /// Venues in leg order; for direct candidates `[buy, sell]`.
    pub fn venues(&self) -> Vec<&'a str> {
        match self {
            Candidate::Direct {
                buy_venue,
                sell_venue,
                ..
            } => vec![*buy_venue, *sell_venue],
            Candidate::Triangular { venues, .. } => venues.to_vec(),
        }
    }

    pub fn prices(&self) -> Vec<f64> {
        match self {
            Candidate::Direct {
                buy_price,
                sell_price,
                ..
            } => vec![*buy_price, *sell_price],
            Candidate::Triangular { prices, .. } => prices.to_vec(),
        }
    }
}

/// Accepted, scored arbitrage cycle.
///
/// Only the filter constructs these, so every instance carries a positive
/// net profit at or above the configured percentage threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    kind: OpportunityKind,
    assets: Vec<Asset>,
    venues: Vec<Venue>,
    prices: Vec<f64>,
    net_profit: f64,
    profit_percentage: f64,
}

impl Opportunity {
    pub(crate) fn new(candidate: &Candidate<'_>, net_profit: f64, profit_percentage: f64) -> Self {
        Self {
            kind: candidate.kind(),
            assets: candidate.assets().into_iter().map(str::to_owned).collect(),
            venues: candidate.venues().into_iter().map(str::to_owned).collect(),
            prices: candidate.prices(),
            net_profit,
            profit_percentage,
        }
    }

    pub fn kind(&self) -> OpportunityKind {
        self.kind
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn net_profit(&self) -> f64 {
        self.net_profit
    }

    pub fn profit_percentage(&self) -> f64 {
        self.profit_percentage
    }

    pub fn first_asset(&self) -> &str {
        self.assets.first().map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_from_quotes_overwrites_duplicates() {
        let table: PriceTable = [
            ("BTC", "x", 100.0),
            ("BTC", "y", 110.0),
            ("BTC", "x", 101.0),
            ("ETH", "x", 5.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.price("BTC", "x"), Some(101.0));
        assert_eq!(table.price("BTC", "z"), None);
        assert_eq!(table.price("SOL", "x"), None);
        assert_eq!(table.assets().collect::<Vec<_>>(), vec!["BTC", "ETH"]);
        assert_eq!(table.venues_for("BTC").count(), 2);
        assert_eq!(table.venues_for("DOGE").count(), 0);
    }

    #[test]
    fn table_deserializes_from_nested_json() {
        let raw = r#"{"BTC":{"kraken":100.5,"lbank":99.0},"ETH":{}}"#;
        let table: PriceTable = serde_json::from_str(raw).expect("json should parse");
        assert_eq!(table.price("BTC", "lbank"), Some(99.0));
        assert_eq!(table.asset_count(), 2);
        assert!(!table.is_empty());
        assert!(PriceTable::default().is_empty());
    }

    #[test]
    fn direct_candidate_exposes_buy_then_sell() {
        let c = Candidate::Direct {
            asset: "BTC",
            buy_venue: "x",
            sell_venue: "y",
            buy_price: 1.0,
            sell_price: 2.0,
        };
        assert_eq!(c.kind(), OpportunityKind::Direct);
        assert_eq!(c.venues(), vec!["x", "y"]);
        assert_eq!(c.prices(), vec![1.0, 2.0]);

        let opp = Opportunity::new(&c, 0.5, 50.0);
        assert_eq!(opp.first_asset(), "BTC");
        assert_eq!(opp.assets(), &["BTC".to_string()]);
    }
}
