//! Candidate cycle enumeration.
//!
//! Everything here is lazy and side-effect free: each call returns a fresh
//! iterator over the same sequence, so a partially consumed partition can be
//! resumed by re-enumerating and skipping what was already seen.

use crate::config::ScanLimits;
use crate::models::{Candidate, PriceTable, Venue};

/// One independently enumerable slice of the candidate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Direct candidates of the asset at this index.
    Direct(usize),
    /// Triangular candidates whose first leg is the asset at this index.
    Triangular(usize),
}

/// The assets and venues one scan may consider, with each asset's quotes
/// pre-resolved in venue order.
#[derive(Debug, Clone)]
pub struct Universe<'a> {
    assets: Vec<&'a str>,
    venues: Vec<&'a str>,
    /// `quotes[asset]` = (venue index, price) for every considered venue
    /// quoting that asset.
    quotes: Vec<Vec<(usize, f64)>>,
}

impl<'a> Universe<'a> {
    /// Venues come from configuration (in configured order, capped by
    /// `max_venues`); assets are the table's assets in ascending order that
    /// have at least one quote on those venues, capped by `max_assets`.
    pub fn new(table: &'a PriceTable, venues: &'a [Venue], limits: &ScanLimits) -> Self {
        let venue_cap = limits.max_venues.unwrap_or(usize::MAX);
        let venues: Vec<&'a str> = venues.iter().map(String::as_str).take(venue_cap).collect();

        let asset_cap = limits.max_assets.unwrap_or(usize::MAX);
        let mut assets = Vec::new();
        let mut quotes = Vec::new();
        for asset in table.assets() {
            if assets.len() >= asset_cap {
                break;
            }
            let row: Vec<(usize, f64)> = venues
                .iter()
                .enumerate()
                .filter_map(|(idx, venue)| table.price(asset, venue).map(|p| (idx, p)))
                .collect();
            if row.is_empty() {
                continue;
            }
            assets.push(asset);
            quotes.push(row);
        }

        Self {
            assets,
            venues,
            quotes,
        }
    }

    pub fn assets(&self) -> &[&'a str] {
        &self.assets
    }

    pub fn venues(&self) -> &[&'a str] {
        &self.venues
    }

    /// Direct partitions first, then triangular, each by ascending asset.
    pub fn partitions(&self) -> Vec<Partition> {
        let n = self.assets.len();
        let mut parts: Vec<Partition> = (0..n).map(Partition::Direct).collect();
        if self.triangular_possible() {
            parts.extend((0..n).map(Partition::Triangular));
        }
        parts
    }

    fn triangular_possible(&self) -> bool {
        self.assets.len() >= 3 && self.venues.len() >= 3
    }

    /// Every (asset, buy venue, sell venue) with distinct venues both quoting
    /// the asset. Both orderings of a venue pair are produced.
    pub fn enumerate_direct(&self) -> impl Iterator<Item = Candidate<'a>> + Clone + '_ {
        (0..self.assets.len()).flat_map(move |asset| self.direct_for(asset))
    }

    /// Every ordered triple of distinct assets on an ordered triple of
    /// distinct venues where all three prices are available.
    pub fn enumerate_triangular(&self) -> impl Iterator<Item = Candidate<'a>> + Clone + '_ {
        (0..self.assets.len()).flat_map(move |first| self.triangular_from(first))
    }

    pub fn direct_for(&self, asset: usize) -> impl Iterator<Item = Candidate<'a>> + Clone + '_ {
        let name = self.assets[asset];
        let row = self.quotes[asset].as_slice();
        row.iter().flat_map(move |&(buy, buy_price)| {
            row.iter()
                .filter(move |&&(sell, _)| sell != buy)
                .map(move |&(sell, sell_price)| Candidate::Direct {
                    asset: name,
                    buy_venue: self.venues[buy],
                    sell_venue: self.venues[sell],
                    buy_price,
                    sell_price,
                })
        })
    }

    pub fn triangular_from(&self, first: usize) -> impl Iterator<Item = Candidate<'a>> + Clone + '_ {
        let n = if self.triangular_possible() {
            self.assets.len()
        } else {
            0
        };
        (0..n)
            .filter(move |&second| second != first)
            .flat_map(move |second| {
                (0..n)
                    .filter(move |&third| third != first && third != second)
                    .map(move |third| (second, third))
            })
            .flat_map(move |(second, third)| self.cycle_legs(first, second, third))
    }

    fn cycle_legs(
        &self,
        a1: usize,
        a2: usize,
        a3: usize,
    ) -> impl Iterator<Item = Candidate<'a>> + Clone + '_ {
        let assets = [self.assets[a1], self.assets[a2], self.assets[a3]];
        let (q1, q2, q3) = (
            self.quotes[a1].as_slice(),
            self.quotes[a2].as_slice(),
            self.quotes[a3].as_slice(),
        );
        q1.iter().flat_map(move |&(v1, p1)| {
            q2.iter()
                .filter(move |&&(v2, _)| v2 != v1)
                .flat_map(move |&(v2, p2)| {
                    q3.iter()
                        .filter(move |&&(v3, _)| v3 != v1 && v3 != v2)
                        .map(move |&(v3, p3)| Candidate::Triangular {
                            assets,
                            venues: [self.venues[v1], self.venues[v2], self.venues[v3]],
                            prices: [p1, p2, p3],
                        })
                })
        })
    }
}
