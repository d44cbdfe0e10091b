pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use models::{
    advisory::{AnalysisReport, Discovery, Forecast, MarketOverview},
    history::Snapshot,
    holding::Holding,
    portfolio::Portfolio,
    transaction::{TradeType, Transaction, TransactionLog},
    user::UserProfile,
};
use providers::traits::AdvisoryProvider;
use services::{
    advisory_service::AdvisoryService, ledger_service::LedgerService, valuation,
};
use storage::{
    session::{SessionRecord, SessionStore},
    store::KeyValueStore,
};

use errors::CoreError;

/// Fixed cash balance every fresh experiment starts with.
pub const STARTING_CASH: f64 = 100.0;

/// Main entry point for the Microcap Lab core library.
///
/// Owns one user's session — portfolio, trade log, profile — plus the
/// services that operate on it. One logical portfolio is mutated by at most
/// one interactive actor; the `&mut self` mutation surface serializes trades
/// naturally. Every mutation persists the full session before returning, so
/// state survives reloads.
#[must_use]
pub struct MicrocapLab {
    user: UserProfile,
    portfolio: Portfolio,
    transactions: TransactionLog,
    ledger: LedgerService,
    advisory: AdvisoryService,
    session: SessionStore,
}

impl std::fmt::Debug for MicrocapLab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrocapLab")
            .field("user", &self.user.id)
            .field("cash", &self.portfolio.cash)
            .field("positions", &self.portfolio.holdings.len())
            .field("snapshots", &self.portfolio.history.len())
            .field("transactions", &self.transactions.len())
            .finish()
    }
}

impl MicrocapLab {
    /// Start a session for `user_id` (login is a stub — any id is accepted).
    ///
    /// Loads the persisted session when one exists; otherwise creates a
    /// fresh portfolio with [`STARTING_CASH`] and a single actual snapshot
    /// valued at that balance, and persists it immediately.
    pub fn login(
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn AdvisoryProvider>,
        user_id: &str,
    ) -> Result<Self, CoreError> {
        let session = SessionStore::new(store);

        let record = match session.load(user_id)? {
            Some(record) => record,
            None => {
                let now = chrono::Utc::now().to_rfc3339();
                let record = SessionRecord {
                    profile: UserProfile::new(user_id, now.clone()),
                    portfolio: Portfolio::new(STARTING_CASH, now),
                    transactions: TransactionLog::new(),
                };
                session.save(&record)?;
                record
            }
        };

        Ok(Self {
            user: record.profile,
            portfolio: record.portfolio,
            transactions: record.transactions,
            ledger: LedgerService::new(),
            advisory: AdvisoryService::new(provider),
            session,
        })
    }

    // ── Trading ─────────────────────────────────────────────────────

    /// Buy `shares` of `ticker` at `price`. Persists on success.
    pub fn buy(&mut self, ticker: &str, price: f64, shares: f64) -> Result<Transaction, CoreError> {
        self.execute(TradeType::Buy, ticker, price, shares)
    }

    /// Sell `shares` of `ticker` at `price`. Persists on success.
    pub fn sell(&mut self, ticker: &str, price: f64, shares: f64) -> Result<Transaction, CoreError> {
        self.execute(TradeType::Sell, ticker, price, shares)
    }

    /// Put the entire cash balance into `ticker` at `price` (simple
    /// division — fractional shares allowed). The shortcut pairs with an
    /// analysis report's ticker and current price.
    pub fn buy_max(&mut self, ticker: &str, price: f64) -> Result<Transaction, CoreError> {
        let shares = self.ledger.max_buy_shares(&self.portfolio, price);
        self.execute(TradeType::Buy, ticker, price, shares)
    }

    /// Close the whole position in `ticker` at `price`.
    pub fn sell_all(&mut self, ticker: &str, price: f64) -> Result<Transaction, CoreError> {
        let shares = self
            .portfolio
            .holding(ticker)
            .map(|h| h.shares)
            .ok_or_else(|| CoreError::NoPosition(ticker.trim().to_uppercase()))?;
        self.execute(TradeType::Sell, ticker, price, shares)
    }

    fn execute(
        &mut self,
        trade_type: TradeType,
        ticker: &str,
        price: f64,
        shares: f64,
    ) -> Result<Transaction, CoreError> {
        let transaction = self.ledger.execute_trade(
            &mut self.portfolio,
            &mut self.transactions,
            trade_type,
            ticker,
            price,
            shares,
        )?;
        self.persist()?;
        Ok(transaction)
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Live total: cash plus holdings at their last-known marks.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        valuation::total_value(&self.portfolio)
    }

    /// Gain/loss against the fixed starting balance.
    #[must_use]
    pub fn profit_and_loss(&self) -> f64 {
        valuation::profit_and_loss(&self.portfolio, STARTING_CASH)
    }

    // ── State accessors ─────────────────────────────────────────────

    #[must_use]
    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    #[must_use]
    pub fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.portfolio.holdings
    }

    /// One position by ticker (case-insensitive).
    #[must_use]
    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        self.portfolio.holding(ticker)
    }

    /// The valuation series: actual prefix plus any forecast suffix.
    #[must_use]
    pub fn history(&self) -> &[Snapshot] {
        self.portfolio.history.series()
    }

    /// All trades, newest first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.entries()
    }

    /// Trades for one ticker, newest first.
    #[must_use]
    pub fn transactions_for(&self, ticker: &str) -> Vec<&Transaction> {
        self.transactions.for_ticker(ticker)
    }

    // ── Advisory ────────────────────────────────────────────────────

    /// Candidate stocks for the discovery feed (empty on gateway failure).
    pub async fn discover(&self) -> Discovery {
        self.advisory.discover().await
    }

    /// Deep analysis of one ticker. Gateway failures surface to the caller.
    pub async fn analyze(&self, ticker: &str) -> Result<AnalysisReport, CoreError> {
        self.advisory.analyze(ticker).await
    }

    /// Broad-market overview (empty on gateway failure). No ledger interaction.
    pub async fn market_overview(&self) -> MarketOverview {
        self.advisory.market_overview().await
    }

    /// Request a fresh forecast, fold it into history (replacing the whole
    /// prediction suffix), and persist. A failed forecast clears the suffix
    /// and explains itself in the returned `rationale`.
    pub async fn refresh_forecast(&mut self) -> Result<Forecast, CoreError> {
        let forecast = self.advisory.refresh_forecast(&mut self.portfolio).await;
        self.persist()?;
        Ok(forecast)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn persist(&self) -> Result<(), CoreError> {
        self.session.save(&SessionRecord {
            profile: self.user.clone(),
            portfolio: self.portfolio.clone(),
            transactions: self.transactions.clone(),
        })
    }
}
