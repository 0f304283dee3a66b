//! Transaction simulation
//!
//! Two phases over one price history: every buy rung is matched first, then
//! one sell per filled buy. Balances are mutated as fills happen and stay on
//! the simulator afterwards for reporting.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::SimulationResult;
use crate::ladder::{buy_ladder, sell_ladder};
use crate::{
    Balances, BuyFill, FillKind, HistoryMatcher, PriceHistory, SellFill, StrategyConfig,
};

/// Buy and sell records of one run, keyed by rung index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutcome {
    pub buys: BTreeMap<usize, BuyFill>,
    /// Never holds a rung missing from `buys`
    pub sells: BTreeMap<usize, SellFill>,
}

/// Latest history index among all buy fills; `None` when nothing was bought
pub fn min_allowed_sell_index(buys: &BTreeMap<usize, BuyFill>) -> Option<usize> {
    buys.values().map(|fill| fill.history_index).max()
}

/// Simulator for a single backtest run. Construct a fresh one per run.
pub struct TransactionSimulator<'a> {
    strategy: &'a StrategyConfig,
    matcher: HistoryMatcher,
    balances: Balances,
}

impl<'a> TransactionSimulator<'a> {
    /// Validate the strategy and seed balances from it
    pub fn new(strategy: &'a StrategyConfig) -> SimulationResult<Self> {
        strategy.validate()?;

        Ok(TransactionSimulator {
            strategy,
            matcher: HistoryMatcher::new(strategy.deviation),
            balances: Balances {
                usdt: strategy.usdt,
                crypto: strategy.crypto,
            },
        })
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Run the buy phase, then the sell phase
    pub fn make_transactions(&mut self, history: &PriceHistory) -> SimulationOutcome {
        let buys = self.try_to_buy(history);

        let sells = match min_allowed_sell_index(&buys) {
            Some(min_index) => self.try_to_sell(history, &buys, min_index),
            None => {
                warn!("No buy order filled, skipping sell phase");
                BTreeMap::new()
            }
        };

        info!(
            buys = buys.len(),
            sells = sells.len(),
            usdt = self.balances.usdt,
            crypto = self.balances.crypto,
            "Simulation finished"
        );

        SimulationOutcome { buys, sells }
    }

    fn try_to_buy(&mut self, history: &PriceHistory) -> BTreeMap<usize, BuyFill> {
        // Fixed for the whole phase, taken before any debit
        let order_notional = self.balances.usdt / self.strategy.rung_count() as f64;
        let mut fills = BTreeMap::new();

        for (rung, target) in buy_ladder(self.strategy).into_iter().enumerate() {
            let Some(m) = self.matcher.match_buy(history.samples(), target) else {
                info!(rung, target, "Buy order not filled");
                continue;
            };

            let quantity = order_notional / m.price;
            self.balances.usdt -= order_notional;
            self.balances.crypto += quantity;

            debug!(
                rung,
                target,
                price = m.price,
                quantity,
                history_index = m.history_index,
                "Buy order filled"
            );

            fills.insert(
                rung,
                BuyFill {
                    rung,
                    price: m.price,
                    quantity,
                    history_index: m.history_index,
                },
            );
        }

        fills
    }

    fn try_to_sell(
        &mut self,
        history: &PriceHistory,
        buys: &BTreeMap<usize, BuyFill>,
        min_index: usize,
    ) -> BTreeMap<usize, SellFill> {
        let targets = sell_ladder(self.strategy);
        let mut fills = BTreeMap::new();

        for (&rung, buy) in buys {
            let target = targets[rung];
            let Some(m) = self.matcher.match_sell(history.samples(), target, min_index) else {
                continue;
            };

            let usdt_amount = buy.quantity * m.price;
            self.balances.crypto -= buy.quantity;
            self.balances.usdt += usdt_amount;

            match m.kind {
                FillKind::Limit => debug!(
                    rung,
                    target,
                    price = m.price,
                    usdt_amount,
                    history_index = m.history_index,
                    "Sell order filled"
                ),
                FillKind::Forced => warn!(
                    rung,
                    target,
                    price = m.price,
                    usdt_amount,
                    history_index = m.history_index,
                    "Sell order force-closed"
                ),
            }

            fills.insert(
                rung,
                SellFill {
                    rung,
                    price: m.price,
                    usdt_amount,
                    history_index: m.history_index,
                    kind: m.kind,
                },
            );
        }

        fills
    }
}
