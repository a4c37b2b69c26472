//! Stable, serializable views of scan results.

use crate::models::{Asset, Opportunity, OpportunityKind, Venue};
use serde::{Deserialize, Serialize};

/// External representation of one opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityRecord {
    pub kind: OpportunityKind,
    pub assets: Vec<Asset>,
    /// Leg order; `[buy, sell]` for direct opportunities.
    pub venues: Vec<Venue>,
    pub prices: Vec<f64>,
    pub net_profit: f64,
    pub profit_percentage: f64,
    pub description: String,
}

impl From<&Opportunity> for OpportunityRecord {
    fn from(opp: &Opportunity) -> Self {
        Self {
            kind: opp.kind(),
            assets: opp.assets().to_vec(),
            venues: opp.venues().to_vec(),
            prices: opp.prices().to_vec(),
            net_profit: opp.net_profit(),
            profit_percentage: opp.profit_percentage(),
            description: describe(opp),
        }
    }
}

/// Result of one scan, ready to hand to a presentation or execution layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub opportunities: Vec<OpportunityRecord>,
    /// The candidate or time budget ran out before the space was exhausted.
    pub truncated: bool,
    /// Candidates dropped because a price was non-positive or not finite.
    pub skipped_count: usize,
    pub candidates_evaluated: usize,
}

/// Human-readable one-liner for logs and UIs.
pub fn describe(opp: &Opportunity) -> String {
    let summary = format!(
        "Net {:.8} ({:.2}%)",
        opp.net_profit(),
        opp.profit_percentage()
    );
    match opp.kind() {
        OpportunityKind::Direct => {
            let (asset, venues, prices) = (opp.first_asset(), opp.venues(), opp.prices());
            format!(
                "Buy {} on {} @ {:.8} → Sell on {} @ {:.8} | {}",
                asset, venues[0], prices[0], venues[1], prices[1], summary
            )
        }
        OpportunityKind::Triangular => {
            let legs: Vec<String> = opp
                .assets()
                .iter()
                .zip(opp.venues())
                .zip(opp.prices())
                .map(|((asset, venue), price)| format!("{asset}@{venue} ({price:.8})"))
                .collect();
            format!("{} | {}", legs.join(" → "), summary)
        }
    }
}
