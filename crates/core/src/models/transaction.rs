use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::Buy => write!(f, "Buy"),
            TradeType::Sell => write!(f, "Sell"),
        }
    }
}

/// A single executed trade. Immutable once created — exactly one record per
/// successful ledger execution, never mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// Buy or Sell
    pub trade_type: TradeType,

    /// Ticker symbol, uppercased
    pub ticker: String,

    /// Number of shares traded (always positive)
    pub shares: f64,

    /// Per-share execution price
    pub price: f64,

    /// Execution timestamp (RFC 3339)
    pub timestamp: String,
}

impl Transaction {
    pub fn new(
        trade_type: TradeType,
        ticker: impl Into<String>,
        shares: f64,
        price: f64,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trade_type,
            ticker: ticker.into().trim().to_uppercase(),
            shares,
            price,
            timestamp: timestamp.into(),
        }
    }

    /// Total cash moved by this trade (cost for buys, proceeds for sells).
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.shares * self.price
    }
}

/// Append-only trade log, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a transaction so the newest trade is always first.
    pub fn record(&mut self, transaction: Transaction) {
        self.entries.insert(0, transaction);
    }

    /// All transactions, newest first.
    #[must_use]
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    /// Transactions for one ticker (case-insensitive), newest first.
    #[must_use]
    pub fn for_ticker(&self, ticker: &str) -> Vec<&Transaction> {
        let upper = ticker.trim().to_uppercase();
        self.entries.iter().filter(|t| t.ticker == upper).collect()
    }

    /// Transactions of one direction (buys or sells), newest first.
    #[must_use]
    pub fn of_type(&self, trade_type: TradeType) -> Vec<&Transaction> {
        self.entries
            .iter()
            .filter(|t| t.trade_type == trade_type)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
