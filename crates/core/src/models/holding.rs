use serde::{Deserialize, Serialize};

/// A currently-open position in a single instrument.
///
/// **Invariant**: `shares > 0` while the holding exists. A position whose
/// share count reaches zero is removed from the portfolio entirely — it is
/// never kept around as a zero record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, uppercased (e.g., "ABEO"). Unique within a portfolio.
    pub ticker: String,

    /// Number of shares held (always positive; fractional allowed)
    pub shares: f64,

    /// Weighted-average per-share acquisition cost
    pub avg_cost: f64,

    /// Last-known mark price (updated on every trade touching this ticker)
    pub current_price: f64,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, shares: f64, avg_cost: f64, current_price: f64) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            shares,
            avg_cost,
            current_price,
        }
    }

    /// Open a fresh position: average cost starts at the purchase price.
    pub fn opened_at(ticker: impl Into<String>, shares: f64, price: f64) -> Self {
        Self::new(ticker, shares, price, price)
    }

    /// Current market value of this position at its last-known mark.
    #[must_use]
    pub fn market_value(&self) -> f64 {
        self.shares * self.current_price
    }

    /// Unrealized gain/loss against the weighted-average cost basis.
    #[must_use]
    pub fn unrealized_pnl(&self) -> f64 {
        (self.current_price - self.avg_cost) * self.shares
    }
}
