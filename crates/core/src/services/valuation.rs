//! Pure valuation helpers — no I/O, no side effects.
//!
//! Used by the ledger to build snapshots and by any presentation layer to
//! display live totals.

use crate::models::portfolio::Portfolio;

/// Total portfolio value: cash plus every holding marked at its
/// last-known price.
#[must_use]
pub fn total_value(portfolio: &Portfolio) -> f64 {
    portfolio.cash
        + portfolio
            .holdings
            .iter()
            .map(|h| h.market_value())
            .sum::<f64>()
}

/// Profit and loss against the experiment's starting balance.
#[must_use]
pub fn profit_and_loss(portfolio: &Portfolio, initial_balance: f64) -> f64 {
    total_value(portfolio) - initial_balance
}
