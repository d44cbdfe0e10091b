use serde::{Deserialize, Serialize};

/// Provenance record for an advisory payload — where the AI grounded a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub title: String,
    pub uri: String,
}

/// A candidate from the discovery feed. The core never validates or dedupes
/// these — they are offered to the user as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockIdea {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub reason: String,
}

/// Discovery feed payload: candidate micro-caps plus source provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub stocks: Vec<StockIdea>,
    pub sources: Vec<SourceRef>,
}

/// The gateway's stance on a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::Hold => write!(f, "HOLD"),
        }
    }
}

/// Deep-analysis payload for a single ticker.
///
/// `ticker` and `current_price` may be used as trade parameters for the
/// max-buy / exit-all shortcuts. `confidence` and `analysis` are opaque
/// display data — never control-flow input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub recommendation: Recommendation,
    pub ticker: String,
    pub current_price: f64,
    /// 0–100 self-reported confidence
    pub confidence: f64,
    pub analysis: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// One forward-looking valuation point supplied by the gateway.
/// The timestamp is a forward label (e.g. "tomorrow", "+7 days") and is
/// folded into history without continuity validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPoint {
    pub timestamp: String,
    pub total_value: f64,
}

/// Forecast payload: projected valuations plus the gateway's reasoning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub predictions: Vec<PredictionPoint>,
    pub rationale: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// A broad-market index reading for the overview panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub name: String,
    pub value: f64,
    pub change_pct: f64,
}

/// Market overview payload. Informational only — no ledger interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub indices: Vec<MarketIndex>,
    pub sources: Vec<SourceRef>,
}
