use crate::appraise::{IntelligenceResult, PartCategory, PartCondition, ValuationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scoring request. Only the category is mandatory; everything else is
/// optional context or recoverable from the listing URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreRequest {
    #[serde(default)]
    pub url: Option<String>,
    /// Stable identifier used to key simulated telemetry when no URL is
    /// available; repeated requests with the same ref score identically.
    #[serde(default)]
    pub listing_ref: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub category: PartCategory,
    #[serde(default)]
    pub condition: PartCondition,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub part_year: Option<i32>,
    #[serde(default)]
    pub engine_miles: Option<u32>,
    #[serde(default)]
    pub buyer_zip: Option<String>,
    #[serde(default)]
    pub seller_zip: Option<String>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
    #[serde(default)]
    pub seller_tenure_months: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScoreResponse {
    pub appraisal_id: String,
    pub valuation: ValuationResult,
    pub intelligence: IntelligenceResult,
    pub stages: Vec<StageReport>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StageReport {
    pub name: String,
    pub elapsed_ms: u128,
    pub timestamp: DateTime<Utc>,
    pub output: Value,
}

impl StageReport {
    pub fn new(name: &str, elapsed_ms: u128, output: Value) -> Self {
        Self {
            name: name.to_string(),
            elapsed_ms,
            timestamp: Utc::now(),
            output,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Explicit scoring context for the granular stage endpoints, bypassing
/// fetch/geo/signal gathering entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextInput {
    #[serde(default)]
    pub title: Option<String>,
    pub category: PartCategory,
    #[serde(default)]
    pub condition: PartCondition,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub part_year: Option<i32>,
    #[serde(default)]
    pub engine_miles: Option<u32>,
    #[serde(default)]
    pub is_marketplace_source: bool,
    #[serde(default)]
    pub distance_miles: f64,
    #[serde(default)]
    pub seller_tenure_months: u32,
    #[serde(default)]
    pub source_fetched: bool,
    #[serde(default)]
    pub has_buyer_geo: bool,
}

impl ContextInput {
    pub fn into_context(self, current_year: i32) -> crate::appraise::ListingContext {
        crate::appraise::ListingContext {
            title: self.title,
            category: self.category,
            condition: self.condition,
            price: self.price.filter(|p| p.is_finite() && *p > 0.0),
            part_year: self.part_year,
            engine_miles: self.engine_miles,
            is_marketplace_source: self.is_marketplace_source,
            distance_miles: if self.distance_miles.is_finite() && self.distance_miles >= 0.0 {
                self.distance_miles
            } else {
                0.0
            },
            seller_tenure_months: self.seller_tenure_months,
            source_fetched: self.source_fetched,
            has_buyer_geo: self.has_buyer_geo,
            current_year,
        }
    }
}
