//! Performance summary of a simulation run
//!
//! Read-only over the strategy, the trade records and the final balances.
//! Unsold crypto is not valued in any figure.

use std::fmt;

use itertools::Itertools;

use crate::{Balances, FillKind, SimulationOutcome, StrategyConfig};

/// Statistics derived from one finished run
#[derive(Debug, Clone)]
pub struct Report<'a> {
    strategy: &'a StrategyConfig,
    outcome: &'a SimulationOutcome,
    /// Per-rung notional, recomputed from the initial balance
    pub order_notional: f64,
    pub final_usdt: f64,
    pub profitable_sells: usize,
    pub forced_sells: usize,
    pub total_profit: f64,
    pub total_profit_pct: f64,
    pub commission: f64,
    pub pure_profit: f64,
    pub pure_profit_pct: f64,
}

impl<'a> Report<'a> {
    pub fn new(
        strategy: &'a StrategyConfig,
        outcome: &'a SimulationOutcome,
        balances: &Balances,
    ) -> Self {
        let start_balance = strategy.usdt;
        let order_notional = start_balance / strategy.rung_count() as f64;
        let final_usdt = balances.usdt;

        let profitable_sells = outcome
            .sells
            .values()
            .filter(|sell| sell.usdt_amount > order_notional)
            .count();
        let forced_sells = outcome
            .sells
            .values()
            .filter(|sell| sell.kind == FillKind::Forced)
            .count();

        let sell_volume: f64 = outcome.sells.values().map(|sell| sell.usdt_amount).sum();
        let buy_volume = outcome.buys.len() as f64 * order_notional;
        let commission = (buy_volume + sell_volume) * strategy.commission;

        let pure_profit = final_usdt - commission;

        Report {
            strategy,
            outcome,
            order_notional,
            final_usdt,
            profitable_sells,
            forced_sells,
            total_profit: final_usdt - start_balance,
            total_profit_pct: final_usdt * 100.0 / start_balance - 100.0,
            commission,
            pure_profit,
            pure_profit_pct: pure_profit * 100.0 / start_balance - 100.0,
        }
    }
}

/// Offsets as absolute percentages, e.g. `0.25%, 0.5%`
fn printable_percents(percents: &[f64]) -> String {
    percents
        .iter()
        .map(|p| format!("{}%", (p * 100.0).abs()))
        .join(", ")
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = self.strategy;

        writeln!(f, "Your wallet money content: {}", strategy.usdt)?;
        writeln!(f, "Strategy start price: {}", strategy.start_price)?;
        writeln!(
            f,
            "Step percents for inputs: {}",
            printable_percents(&strategy.input_percents)
        )?;
        writeln!(
            f,
            "Step percents for outputs: {}",
            printable_percents(&strategy.output_percents)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "You should place {} orders for buying.",
            self.outcome.buys.len()
        )?;
        for (count, buy) in self.outcome.buys.values().enumerate() {
            writeln!(
                f,
                "Buy order price №{} must be equal to {}$ per coin. \
                 You will get {:.9} crypto coins. \
                 Price for that order will be equal to {:.2}$",
                count + 1,
                buy.price,
                buy.quantity,
                self.order_notional
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "You should place {} orders for selling.",
            self.outcome.sells.len()
        )?;
        for (count, sell) in self.outcome.sells.values().enumerate() {
            let marker = match sell.kind {
                FillKind::Limit => "",
                FillKind::Forced => " (forced close)",
            };
            writeln!(
                f,
                "Sell order price №{} must be equal to {}$ per coin. \
                 You will get {:.2} dollars.{}",
                count + 1,
                sell.price,
                sell.usdt_amount,
                marker
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Number of profitable trades: {}", self.profitable_sells)?;
        writeln!(f, "Number of forced closes: {}", self.forced_sells)?;
        writeln!(
            f,
            "Your total profit will be equal {:.2}$ - {:.2}$ = {:.2}$. Or {:+.3}%",
            self.final_usdt, strategy.usdt, self.total_profit, self.total_profit_pct
        )?;
        writeln!(f, "Commission for trades: {:.3}$", self.commission)?;
        write!(
            f,
            "Pure profit: {:.2}$. Or {:+.3}%",
            self.pure_profit, self.pure_profit_pct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuyFill, SellFill};
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn strategy() -> StrategyConfig {
        StrategyConfig {
            start_price: 100.0,
            input_percents: vec![-0.01, -0.02],
            output_percents: vec![0.02, 0.03],
            usdt: 200.0,
            crypto: 0.0,
            commission: 0.001,
            deviation: 0.001,
        }
    }

    fn outcome() -> SimulationOutcome {
        let mut buys = BTreeMap::new();
        buys.insert(
            0,
            BuyFill {
                rung: 0,
                price: 99.0,
                quantity: 100.0 / 99.0,
                history_index: 1,
            },
        );
        buys.insert(
            1,
            BuyFill {
                rung: 1,
                price: 97.0,
                quantity: 100.0 / 97.0,
                history_index: 3,
            },
        );
        let mut sells = BTreeMap::new();
        sells.insert(
            0,
            SellFill {
                rung: 0,
                price: 110.0,
                usdt_amount: 110.0,
                history_index: 5,
                kind: FillKind::Limit,
            },
        );
        sells.insert(
            1,
            SellFill {
                rung: 1,
                price: 90.0,
                usdt_amount: 90.0,
                history_index: 4,
                kind: FillKind::Forced,
            },
        );
        SimulationOutcome { buys, sells }
    }

    #[test]
    fn test_statistics() {
        let s = strategy();
        let o = outcome();
        let balances = Balances {
            usdt: 200.0,
            crypto: 0.0,
        };
        let report = Report::new(&s, &o, &balances);

        assert_relative_eq!(report.order_notional, 100.0);
        assert_eq!(report.profitable_sells, 1);
        assert_eq!(report.forced_sells, 1);
        assert_relative_eq!(report.total_profit, 0.0);
        // (2 * 100 + 110 + 90) * 0.001
        assert_relative_eq!(report.commission, 0.4);
        assert_relative_eq!(report.pure_profit, 199.6);
        assert_relative_eq!(report.pure_profit_pct, -0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_rendered_report() {
        let s = strategy();
        let o = outcome();
        let balances = Balances {
            usdt: 210.0,
            crypto: 0.0,
        };
        let text = Report::new(&s, &o, &balances).to_string();

        assert!(text.contains("Your wallet money content: 200"));
        assert!(text.contains("Step percents for inputs: 1%, 2%"));
        assert!(text.contains("Step percents for outputs: 2%, 3%"));
        assert!(text.contains("You should place 2 orders for buying."));
        assert!(text.contains("You will get 1.010101010 crypto coins."));
        assert!(text.contains("Price for that order will be equal to 100.00$"));
        assert!(text.contains("You will get 90.00 dollars. (forced close)"));
        assert!(text.contains("Number of profitable trades: 1"));
        assert!(text.contains("210.00$ - 200.00$ = 10.00$. Or +5.000%"));
        assert!(text.contains("Commission for trades: 0.400$"));
        assert!(text.contains("Pure profit: 209.60$. Or +4.800%"));
    }

    #[test]
    fn test_empty_run() {
        let s = strategy();
        let o = SimulationOutcome::default();
        let balances = Balances {
            usdt: 200.0,
            crypto: 0.0,
        };
        let report = Report::new(&s, &o, &balances);
        assert_eq!(report.profitable_sells, 0);
        assert_relative_eq!(report.commission, 0.0);
        assert!(report.to_string().contains("You should place 0 orders for selling."));
    }
}
