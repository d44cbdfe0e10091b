use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use super::schema;
use super::traits::AdvisoryProvider;
use crate::errors::CoreError;
use crate::models::advisory::{
    AnalysisReport, Discovery, Forecast, MarketIndex, MarketOverview, PredictionPoint,
    Recommendation, SourceRef, StockIdea,
};
use crate::models::holding::Holding;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Number of forward points requested per forecast (tomorrow through +7 days).
const FORECAST_DAYS: usize = 7;

/// Gemini-backed advisory gateway.
///
/// Each call sends a natural-language instruction with a declared JSON
/// response schema (`generationConfig.responseSchema`) and the Google Search
/// grounding tool. The single JSON document in the first candidate is
/// deserialized into the typed payload; grounding chunks become `{title, uri}`
/// provenance records. Schema violations and parse failures surface as
/// [`CoreError::MalformedResponse`] — never a panic.
pub struct GeminiAdvisor {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiAdvisor {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: String, model: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(60));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            model: model.into(),
        }
    }

    /// Send one instruction + response schema, return the parsed JSON
    /// document and any grounding provenance.
    async fn generate(
        &self,
        instruction: &str,
        response_schema: Value,
    ) -> Result<(Value, Vec<SourceRef>), CoreError> {
        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": instruction }] }],
            "tools": [{ "google_search": {} }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema,
            },
        });

        debug!(model = %self.model, "sending advisory request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CoreError::Api {
                provider: "Gemini".into(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CoreError::MalformedResponse(format!("invalid response envelope: {e}")))?;

        let candidate = envelope
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::MalformedResponse("no candidates returned".into()))?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CoreError::MalformedResponse(
                "candidate carried no text payload".into(),
            ));
        }

        let document: Value = serde_json::from_str(&text)
            .map_err(|e| CoreError::MalformedResponse(format!("response is not valid JSON: {e}")))?;

        let sources = candidate
            .grounding_metadata
            .map(|g| {
                g.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| {
                        let web = chunk.web?;
                        Some(SourceRef {
                            title: web.title.unwrap_or_default(),
                            uri: web.uri?,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok((document, sources))
    }
}

// ── Gemini API response envelope ────────────────────────────────────

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize)]
struct WebSource {
    title: Option<String>,
    uri: Option<String>,
}

// ── Typed call payloads (the declared-schema side of the contract) ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryPayload {
    stocks: Vec<StockIdea>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    recommendation: Recommendation,
    ticker: String,
    current_price: f64,
    confidence: f64,
    analysis: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPayload {
    predictions: Vec<PredictionPoint>,
    rationale: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewPayload {
    indices: Vec<MarketIndex>,
}

fn stock_idea_schema() -> Value {
    schema::object(
        &[
            ("ticker", schema::string()),
            ("name", schema::string()),
            ("price", schema::number()),
            ("reason", schema::string()),
        ],
        &["ticker", "name", "price", "reason"],
    )
}

fn prediction_point_schema() -> Value {
    schema::object(
        &[
            ("timestamp", schema::string()),
            ("totalValue", schema::number()),
        ],
        &["timestamp", "totalValue"],
    )
}

/// One line per position for the forecast instruction.
fn describe_positions(holdings: &[Holding], cash: f64) -> String {
    let mut lines: Vec<String> = holdings
        .iter()
        .map(|h| {
            format!(
                "{}: {} shares, avg cost {:.2}, last price {:.2}",
                h.ticker, h.shares, h.avg_cost, h.current_price
            )
        })
        .collect();
    lines.push(format!("Cash: {cash:.2}"));
    lines.join("\n")
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AdvisoryProvider for GeminiAdvisor {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn discover(&self) -> Result<Discovery, CoreError> {
        let instruction = "Research US-listed micro-cap stocks (market cap under $300M) that \
             currently look interesting for a small speculative portfolio. Return 5 candidates \
             with ticker, company name, latest share price in USD, and a one-sentence reason.";
        let response_schema = schema::object(
            &[("stocks", schema::array(stock_idea_schema()))],
            &["stocks"],
        );

        let (document, sources) = self.generate(instruction, response_schema).await?;
        let payload: DiscoveryPayload = serde_json::from_value(document)
            .map_err(|e| CoreError::MalformedResponse(format!("discovery payload: {e}")))?;

        Ok(Discovery {
            stocks: payload.stocks,
            sources,
        })
    }

    async fn analyze(&self, ticker: &str) -> Result<AnalysisReport, CoreError> {
        let ticker = ticker.trim().to_uppercase();
        let instruction = format!(
            "Research the stock with ticker symbol {ticker}. Give a BUY, SELL, or HOLD \
             recommendation with the latest share price in USD, a confidence score from 0 to \
             100, and a short analysis of the company's current situation."
        );
        let response_schema = schema::object(
            &[
                (
                    "recommendation",
                    schema::enumeration(&["BUY", "SELL", "HOLD"]),
                ),
                ("ticker", schema::string()),
                ("currentPrice", schema::number()),
                ("confidence", schema::number()),
                ("analysis", schema::string()),
            ],
            &["recommendation", "ticker", "currentPrice", "confidence", "analysis"],
        );

        let (document, sources) = self.generate(&instruction, response_schema).await?;
        let payload: AnalysisPayload = serde_json::from_value(document)
            .map_err(|e| CoreError::MalformedResponse(format!("analysis payload: {e}")))?;

        // A syntactically valid answer about the wrong instrument, or one
        // with no usable price, is a failed lookup rather than a report.
        if !payload.ticker.eq_ignore_ascii_case(&ticker) || payload.current_price <= 0.0 {
            return Err(CoreError::LookupFailed(ticker));
        }

        Ok(AnalysisReport {
            recommendation: payload.recommendation,
            ticker: payload.ticker.to_uppercase(),
            current_price: payload.current_price,
            confidence: payload.confidence.clamp(0.0, 100.0),
            analysis: payload.analysis,
            sources,
        })
    }

    async fn predict(&self, holdings: &[Holding], cash: f64) -> Result<Forecast, CoreError> {
        let instruction = format!(
            "This simulated portfolio currently holds:\n{}\n\nProject the total portfolio \
             value (cash plus holdings) for each of the next {FORECAST_DAYS} days, starting \
             tomorrow. Label each point with a short forward-looking timestamp such as \
             \"tomorrow\" or \"+3 days\", and explain your reasoning briefly.",
            describe_positions(holdings, cash)
        );
        let response_schema = schema::object(
            &[
                ("predictions", schema::array(prediction_point_schema())),
                ("rationale", schema::string()),
            ],
            &["predictions", "rationale"],
        );

        let (document, sources) = self.generate(&instruction, response_schema).await?;
        let payload: ForecastPayload = serde_json::from_value(document)
            .map_err(|e| CoreError::MalformedResponse(format!("forecast payload: {e}")))?;

        Ok(Forecast {
            predictions: payload.predictions,
            rationale: payload.rationale,
            sources,
        })
    }

    async fn market_overview(&self) -> Result<MarketOverview, CoreError> {
        let instruction = "Report the latest readings of the major US market indices (S&P 500, \
             Nasdaq Composite, Dow Jones Industrial Average, Russell 2000): current value and \
             percent change on the day.";
        let response_schema = schema::object(
            &[(
                "indices",
                schema::array(schema::object(
                    &[
                        ("name", schema::string()),
                        ("value", schema::number()),
                        ("changePct", schema::number()),
                    ],
                    &["name", "value", "changePct"],
                )),
            )],
            &["indices"],
        );

        let (document, sources) = self.generate(instruction, response_schema).await?;
        let payload: OverviewPayload = serde_json::from_value(document)
            .map_err(|e| CoreError::MalformedResponse(format!("overview payload: {e}")))?;

        Ok(MarketOverview {
            indices: payload.indices,
            sources,
        })
    }
}
