use std::sync::Arc;

use tracing::warn;

use crate::errors::CoreError;
use crate::models::advisory::{AnalysisReport, Discovery, Forecast, MarketOverview};
use crate::models::history::Snapshot;
use crate::models::portfolio::Portfolio;
use crate::providers::traits::AdvisoryProvider;

/// Applies the per-call-site failure policy over an [`AdvisoryProvider`]
/// and folds forecast payloads into portfolio history.
///
/// Policy: discovery and market overview degrade to empty payloads (the
/// feed just shows nothing); ticker analysis has no meaningful empty state,
/// so its errors surface to the caller; a failed forecast clears the
/// prediction suffix explicitly rather than leaving stale points behind.
pub struct AdvisoryService {
    provider: Arc<dyn AdvisoryProvider>,
}

impl AdvisoryService {
    pub fn new(provider: Arc<dyn AdvisoryProvider>) -> Self {
        Self { provider }
    }

    /// Candidate stocks for the discovery feed. Falls back to an empty
    /// payload when the gateway misbehaves.
    pub async fn discover(&self) -> Discovery {
        match self.provider.discover().await {
            Ok(discovery) => discovery,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "discovery failed, serving empty feed");
                Discovery::default()
            }
        }
    }

    /// Deep analysis of one ticker. Hard failure — no empty-state fallback.
    pub async fn analyze(&self, ticker: &str) -> Result<AnalysisReport, CoreError> {
        self.provider.analyze(ticker).await
    }

    /// Broad-market overview. Falls back to an empty payload on failure.
    pub async fn market_overview(&self) -> MarketOverview {
        match self.provider.market_overview().await {
            Ok(overview) => overview,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "market overview failed, serving empty payload");
                MarketOverview::default()
            }
        }
    }

    /// Request a fresh forecast and fold it into the portfolio's history.
    ///
    /// On success the prediction suffix is replaced with the new points.
    /// On failure the suffix is cleared to empty — never left stale — and
    /// the returned forecast explains itself in `rationale`.
    pub async fn refresh_forecast(&self, portfolio: &mut Portfolio) -> Forecast {
        match self
            .provider
            .predict(&portfolio.holdings, portfolio.cash)
            .await
        {
            Ok(forecast) => {
                let points = forecast
                    .predictions
                    .iter()
                    .map(|p| Snapshot::prediction(p.timestamp.clone(), p.total_value))
                    .collect();
                portfolio.history.replace_predictions(points);
                forecast
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "forecast failed, clearing prediction suffix");
                portfolio.history.replace_predictions(Vec::new());
                Forecast {
                    predictions: Vec::new(),
                    rationale: format!("Forecast unavailable: {e}"),
                    sources: Vec::new(),
                }
            }
        }
    }
}
