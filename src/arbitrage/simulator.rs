use crate::models::Candidate;

/// Outcome of walking a candidate's legs with fees applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedTrade {
    /// Proceeds minus cost; negative when the cycle loses money.
    pub net_profit: f64,
    /// Fee rate times the sum of the leg prices. For triangular cycles this is
    /// in price units, not per unit of reference value like `net_profit`.
    pub fees_paid: f64,
    /// Capital committed to the first leg.
    pub investment: f64,
}

fn evaluable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Simulate `candidate` at `fee_rate` per leg.
///
/// Returns `None` when the candidate is not evaluable (a non-positive or
/// non-finite price, or a result that overflows).
///
/// * Direct: buy one unit on the buy venue paying `buy * (1 + fee)`, sell it
///   on the sell venue receiving `sell * (1 - fee)`.
/// * Triangular: start from one unit of reference value, buy the second asset
///   at `p2`, convert through the first at `p1` (both buy legs scale cost by
///   `1 + fee`), then sell the third at `p3` scaling proceeds by `1 - fee`.
pub fn simulate(candidate: &Candidate<'_>, fee_rate: f64) -> Option<SimulatedTrade> {
    let trade = match *candidate {
        Candidate::Direct {
            buy_price,
            sell_price,
            ..
        } => {
            if !evaluable(buy_price) || !evaluable(sell_price) {
                return None;
            }
            let cost = buy_price * (1.0 + fee_rate);
            let proceeds = sell_price * (1.0 - fee_rate);
            SimulatedTrade {
                net_profit: proceeds - cost,
                fees_paid: fee_rate * (buy_price + sell_price),
                investment: cost,
            }
        }
        Candidate::Triangular {
            prices: [p1, p2, p3],
            ..
        } => {
            if !evaluable(p1) || !evaluable(p2) || !evaluable(p3) {
                return None;
            }
            let investment = 1.0;
            // leg 1: buy through venue 2
            let held = investment / (p2 * (1.0 + fee_rate));
            // leg 2: buy through venue 1
            let held = held * p1 / (1.0 + fee_rate);
            // leg 3: sell on venue 3
            let final_amount = held * p3 * (1.0 - fee_rate);
            SimulatedTrade {
                net_profit: final_amount - investment,
                fees_paid: fee_rate * (p1 + p2 + p3),
                investment,
            }
        }
    };

    (trade.net_profit.is_finite() && trade.fees_paid.is_finite()).then_some(trade)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn direct(buy_price: f64, sell_price: f64) -> Candidate<'static> {
        Candidate::Direct {
            asset: "BTC",
            buy_venue: "x",
            sell_venue: "y",
            buy_price,
            sell_price,
        }
    }

    fn triangular(prices: [f64; 3]) -> Candidate<'static> {
        Candidate::Triangular {
            assets: ["A", "B", "C"],
            venues: ["x", "y", "z"],
            prices,
        }
    }

    #[test]
    fn direct_without_fees_is_the_spread() {
        let t = simulate(&direct(100.0, 110.0), 0.0).expect("evaluable");
        assert!((t.net_profit - 10.0).abs() < EPS);
        assert_eq!(t.fees_paid, 0.0);
        assert_eq!(t.investment, 100.0);
    }

    #[test]
    fn direct_applies_fee_on_both_legs() {
        let fee = 0.002;
        let t = simulate(&direct(100.0, 110.0), fee).expect("evaluable");
        let expected = 110.0 * (1.0 - fee) - 100.0 * (1.0 + fee);
        assert!((t.net_profit - expected).abs() < EPS);
        assert!((t.fees_paid - 0.42).abs() < EPS);
    }

    #[test]
    fn direct_reverse_direction_loses() {
        let t = simulate(&direct(110.0, 100.0), 0.001).expect("evaluable");
        assert!(t.net_profit < 0.0);
    }

    #[test]
    fn triangular_without_fees_matches_price_ratio() {
        let t = simulate(&triangular([2.0, 4.0, 3.0]), 0.0).expect("evaluable");
        // p1 / p2 * p3 - 1
        assert!((t.net_profit - 0.5).abs() < EPS);
        assert_eq!(t.investment, 1.0);
    }

    #[test]
    fn triangular_applies_fee_per_leg() {
        let fee = 0.002;
        let [p1, p2, p3] = [1.0, 0.9, 1.0];
        let t = simulate(&triangular([p1, p2, p3]), fee).expect("evaluable");
        let expected = p1 * p3 * (1.0 - fee) / (p2 * (1.0 + fee) * (1.0 + fee)) - 1.0;
        assert!((t.net_profit - expected).abs() < EPS);
        assert!((t.fees_paid - fee * 2.9).abs() < EPS);
    }

    #[test]
    fn non_positive_or_non_finite_prices_are_not_evaluable() {
        assert_eq!(simulate(&direct(0.0, 110.0), 0.0), None);
        assert_eq!(simulate(&direct(100.0, -1.0), 0.0), None);
        assert_eq!(simulate(&direct(f64::NAN, 1.0), 0.0), None);
        assert_eq!(simulate(&triangular([1.0, 0.0, 1.0]), 0.0), None);
        assert_eq!(simulate(&triangular([1.0, 1.0, f64::INFINITY]), 0.0), None);
    }

    #[test]
    fn overflowing_result_is_not_evaluable() {
        assert_eq!(simulate(&triangular([f64::MAX, f64::MIN_POSITIVE, f64::MAX]), 0.0), None);
    }
}
