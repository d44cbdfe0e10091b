use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::advisory::{AnalysisReport, Discovery, Forecast, MarketOverview};
use crate::models::holding::Holding;

/// Trait abstraction for the AI-backed advisory gateway.
///
/// The core only depends on the four response shapes, never on a concrete
/// provider. Production wires in the network client; tests wire in a
/// deterministic stub — essential, since live LLM responses are
/// non-deterministic and must not block unit testing of the ledger.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AdvisoryProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Candidate micro-caps for the discovery feed.
    async fn discover(&self) -> Result<Discovery, CoreError>;

    /// Deep analysis of a single ticker: recommendation, price, confidence,
    /// narrative, and source provenance.
    async fn analyze(&self, ticker: &str) -> Result<AnalysisReport, CoreError>;

    /// Forward valuation projections for the given positions and cash.
    async fn predict(&self, holdings: &[Holding], cash: f64) -> Result<Forecast, CoreError>;

    /// Broad-market index readings. Informational only.
    async fn market_overview(&self) -> Result<MarketOverview, CoreError>;
}
