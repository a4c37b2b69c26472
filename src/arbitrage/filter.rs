use crate::arbitrage::simulator::SimulatedTrade;
use crate::config::ProfitBasis;
use crate::models::{Candidate, Opportunity};
use std::cmp::Ordering;

/// Profitability gate applied to every simulated candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityFilter {
    pub min_profit_pct: f64,
    pub basis: ProfitBasis,
}

impl OpportunityFilter {
    pub fn new(min_profit_pct: f64, basis: ProfitBasis) -> Self {
        Self {
            min_profit_pct,
            basis,
        }
    }

    /// Profit as a percentage of fees paid (or of capital committed when the
    /// basis says so, or when the cycle paid no fee at all).
    pub fn profit_percentage(&self, trade: &SimulatedTrade) -> f64 {
        let denominator = match self.basis {
            ProfitBasis::Fees if trade.fees_paid > 0.0 => trade.fees_paid,
            _ => trade.investment,
        };
        trade.net_profit / denominator * 100.0
    }

    /// Score a simulated candidate, keeping it only if it makes money, clears
    /// the threshold and is the canonical orientation of its cycle.
    pub fn accept(&self, candidate: &Candidate<'_>, trade: &SimulatedTrade) -> Option<Opportunity> {
        if !(trade.net_profit > 0.0) || !is_canonical(candidate) {
            return None;
        }
        let pct = self.profit_percentage(trade);
        if !pct.is_finite() || pct < self.min_profit_pct {
            return None;
        }
        Some(Opportunity::new(candidate, trade.net_profit, pct))
    }
}

/// Each economic spread is reported from one vantage point only.
///
/// A direct pair is kept in the orientation that sells higher than it buys.
/// A triangular cycle and its mirror (legs one and three swapped, which
/// simulates to the same result) are kept in the orientation whose first
/// asset sorts before its last.
pub fn is_canonical(candidate: &Candidate<'_>) -> bool {
    match candidate {
        Candidate::Direct {
            buy_price,
            sell_price,
            ..
        } => sell_price > buy_price,
        Candidate::Triangular { assets, .. } => assets[0] < assets[2],
    }
}

/// Descending net profit; ties by ascending first asset, then kind, assets,
/// venues and prices so the order is total.
pub fn rank(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(compare);
}

fn compare(a: &Opportunity, b: &Opportunity) -> Ordering {
    b.net_profit()
        .total_cmp(&a.net_profit())
        .then_with(|| a.first_asset().cmp(b.first_asset()))
        .then_with(|| a.kind().cmp(&b.kind()))
        .then_with(|| a.assets().cmp(b.assets()))
        .then_with(|| a.venues().cmp(b.venues()))
        .then_with(|| {
            a.prices()
                .iter()
                .zip(b.prices())
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::simulator::simulate;

    fn direct<'a>(asset: &'a str, buy: (&'a str, f64), sell: (&'a str, f64)) -> Candidate<'a> {
        Candidate::Direct {
            asset,
            buy_venue: buy.0,
            sell_venue: sell.0,
            buy_price: buy.1,
            sell_price: sell.1,
        }
    }

    fn scored(filter: &OpportunityFilter, c: Candidate<'_>, fee: f64) -> Option<Opportunity> {
        let trade = simulate(&c, fee)?;
        filter.accept(&c, &trade)
    }

    #[test]
    fn zero_profit_is_rejected() {
        let filter = OpportunityFilter::new(0.0, ProfitBasis::Fees);
        assert!(scored(&filter, direct("BTC", ("x", 100.0), ("y", 100.0)), 0.0).is_none());
    }

    #[test]
    fn fee_basis_percentage() {
        let filter = OpportunityFilter::new(1.0, ProfitBasis::Fees);
        let trade = SimulatedTrade {
            net_profit: 0.5,
            fees_paid: 2.0,
            investment: 100.0,
        };
        assert!((filter.profit_percentage(&trade) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn fee_basis_falls_back_to_investment_without_fees() {
        let filter = OpportunityFilter::new(1.0, ProfitBasis::Fees);
        let opp = scored(&filter, direct("BTC", ("x", 100.0), ("y", 110.0)), 0.0)
            .expect("profitable");
        assert!((opp.net_profit() - 10.0).abs() < 1e-12);
        assert!((opp.profit_percentage() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn investment_basis_percentage() {
        let filter = OpportunityFilter::new(0.0, ProfitBasis::Investment);
        let trade = SimulatedTrade {
            net_profit: 0.5,
            fees_paid: 2.0,
            investment: 100.0,
        };
        assert!((filter.profit_percentage(&trade) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn below_threshold_is_rejected() {
        let filter = OpportunityFilter::new(50.0, ProfitBasis::Fees);
        let c = direct("BTC", ("x", 100.0), ("y", 100.3));
        // net = 100.3*0.999 - 100*1.001 = 0.0997; fees = 0.2003; pct ~ 49.8
        assert!(scored(&filter, c, 0.001).is_none());
        let lenient = OpportunityFilter::new(49.0, ProfitBasis::Fees);
        assert!(scored(&lenient, c, 0.001).is_some());
    }

    #[test]
    fn only_one_orientation_survives() {
        let filter = OpportunityFilter::new(0.0, ProfitBasis::Fees);
        let forward = direct("BTC", ("x", 100.0), ("y", 110.0));
        let backward = direct("BTC", ("y", 110.0), ("x", 100.0));
        assert!(is_canonical(&forward));
        assert!(!is_canonical(&backward));
        assert!(scored(&filter, backward, 0.0).is_none());

        let cycle = Candidate::Triangular {
            assets: ["A", "B", "C"],
            venues: ["x", "y", "z"],
            prices: [1.0, 0.9, 1.0],
        };
        let mirror = Candidate::Triangular {
            assets: ["C", "B", "A"],
            venues: ["z", "y", "x"],
            prices: [1.0, 0.9, 1.0],
        };
        assert!(scored(&filter, cycle, 0.002).is_some());
        assert!(scored(&filter, mirror, 0.002).is_none());
    }

    #[test]
    fn rank_orders_by_profit_then_asset() {
        let filter = OpportunityFilter::new(0.0, ProfitBasis::Investment);
        let mut opps: Vec<Opportunity> = [
            direct("ETH", ("x", 10.0), ("y", 11.0)),
            direct("BTC", ("x", 100.0), ("y", 101.0)),
            direct("ADA", ("x", 100.0), ("y", 101.0)),
            direct("SOL", ("x", 10.0), ("y", 15.0)),
        ]
        .into_iter()
        .filter_map(|c| scored(&filter, c, 0.0))
        .collect();

        rank(&mut opps);
        let order: Vec<&str> = opps.iter().map(|o| o.first_asset()).collect();
        assert_eq!(order, vec!["SOL", "ADA", "BTC", "ETH"]);
    }
}
