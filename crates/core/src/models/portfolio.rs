use serde::{Deserialize, Serialize};

use super::history::History;
use super::holding::Holding;

/// The simulated portfolio: cash balance, open positions, and the valuation
/// time series. Mutated only through ledger trade execution and forecast
/// folding; persisted in full after every mutation.
///
/// Invariant: `cash + Σ(holding.market_value())` equals the total value at
/// any observation point. Cash moves exactly by executed buy cost and sell
/// proceeds — no fees are modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Uninvested cash balance (never negative)
    pub cash: f64,

    /// Open positions, at most one per ticker
    pub holdings: Vec<Holding>,

    /// Valuation snapshots: permanent actual prefix + replaceable forecast suffix
    pub history: History,
}

impl Portfolio {
    /// A brand-new portfolio: starting cash and a single actual snapshot
    /// time-stamped at creation, valued at that same starting cash.
    pub fn new(starting_cash: f64, created_at: impl Into<String>) -> Self {
        Self {
            cash: starting_cash,
            holdings: Vec::new(),
            history: History::starting_at(created_at, starting_cash),
        }
    }

    /// Look up an open position by ticker (case-insensitive).
    #[must_use]
    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        let upper = ticker.trim().to_uppercase();
        self.holdings.iter().find(|h| h.ticker == upper)
    }

    pub(crate) fn holding_mut(&mut self, ticker: &str) -> Option<&mut Holding> {
        let upper = ticker.trim().to_uppercase();
        self.holdings.iter_mut().find(|h| h.ticker == upper)
    }

    /// Tickers of all open positions, in insertion order.
    #[must_use]
    pub fn tickers(&self) -> Vec<&str> {
        self.holdings.iter().map(|h| h.ticker.as_str()).collect()
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new(
            crate::STARTING_CASH,
            chrono::Utc::now().to_rfc3339(),
        )
    }
}
