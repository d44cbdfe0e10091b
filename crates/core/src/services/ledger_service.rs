use chrono::Utc;
use tracing::info;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::history::Snapshot;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::{TradeType, Transaction, TransactionLog};
use crate::services::valuation;

/// Absorbs float rounding on max-size orders (`shares = cash / price`),
/// where `shares * price` can land a few ulps above the cash balance.
const CASH_TOLERANCE: f64 = 1e-9;

/// Executes buy/sell trades against a portfolio with full validation,
/// weighted-average cost accounting, and snapshot/log side effects.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
///
/// Every trade is all-or-nothing: validation completes before any mutation,
/// so a rejected trade leaves cash, holdings, history, and the log untouched.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Execute a trade. On success the portfolio is mutated, one actual
    /// snapshot is appended (discarding any stale forecast suffix), and the
    /// returned transaction is recorded newest-first in `log`.
    pub fn execute_trade(
        &self,
        portfolio: &mut Portfolio,
        log: &mut TransactionLog,
        trade_type: TradeType,
        ticker: &str,
        price: f64,
        shares: f64,
    ) -> Result<Transaction, CoreError> {
        let ticker = Self::validate_request(ticker, price, shares)?;

        match trade_type {
            TradeType::Buy => self.apply_buy(portfolio, &ticker, price, shares)?,
            TradeType::Sell => self.apply_sell(portfolio, &ticker, price, shares)?,
        }

        // Post-trade side effects: one actual snapshot (which drops any
        // prediction suffix — the trade invalidated the forecast) and one
        // immutable log entry.
        let timestamp = Utc::now().to_rfc3339();
        let total = valuation::total_value(portfolio);
        portfolio
            .history
            .append_actual(Snapshot::actual(timestamp.clone(), total));

        let transaction = Transaction::new(trade_type, ticker, shares, price, timestamp);
        log.record(transaction.clone());

        info!(
            trade = %transaction.trade_type,
            ticker = %transaction.ticker,
            shares = transaction.shares,
            price = transaction.price,
            total,
            "trade executed"
        );

        Ok(transaction)
    }

    /// The largest buy the cash balance supports at `price`, as a share
    /// count (simple division — fractional shares allowed).
    #[must_use]
    pub fn max_buy_shares(&self, portfolio: &Portfolio, price: f64) -> f64 {
        if price <= 0.0 || !price.is_finite() {
            return 0.0;
        }
        portfolio.cash / price
    }

    // ── Internal ────────────────────────────────────────────────────

    fn validate_request(ticker: &str, price: f64, shares: f64) -> Result<String, CoreError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(CoreError::InvalidTrade("ticker must not be empty".into()));
        }
        if !shares.is_finite() || shares <= 0.0 {
            return Err(CoreError::InvalidTrade(format!(
                "share count must be positive, got {shares}"
            )));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::InvalidTrade(format!(
                "price must be non-negative, got {price}"
            )));
        }
        Ok(ticker)
    }

    fn apply_buy(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
        price: f64,
        shares: f64,
    ) -> Result<(), CoreError> {
        let cost = price * shares;
        if cost > portfolio.cash + CASH_TOLERANCE {
            return Err(CoreError::InsufficientFunds {
                needed: cost,
                available: portfolio.cash,
            });
        }

        match portfolio.holding_mut(ticker) {
            Some(held) => {
                // Weighted-average cost basis across the merged position
                let new_shares = held.shares + shares;
                held.avg_cost = (held.shares * held.avg_cost + shares * price) / new_shares;
                held.shares = new_shares;
                held.current_price = price;
            }
            None => portfolio.holdings.push(Holding::opened_at(ticker, shares, price)),
        }

        portfolio.cash -= cost;
        if portfolio.cash < 0.0 {
            // Only reachable within CASH_TOLERANCE
            portfolio.cash = 0.0;
        }
        Ok(())
    }

    fn apply_sell(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
        price: f64,
        shares: f64,
    ) -> Result<(), CoreError> {
        let held = portfolio
            .holding_mut(ticker)
            .ok_or_else(|| CoreError::NoPosition(ticker.to_string()))?;

        if shares > held.shares {
            return Err(CoreError::InsufficientShares {
                ticker: ticker.to_string(),
                requested: shares,
                held: held.shares,
            });
        }

        held.shares -= shares;
        held.current_price = price;
        let remaining = held.shares;

        // A fully-closed position is removed, not kept as a zero record.
        // Its average-cost history goes with it — the transaction log
        // remains the audit trail.
        if remaining <= f64::EPSILON {
            portfolio.holdings.retain(|h| h.ticker != ticker);
        }

        portfolio.cash += price * shares;
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
