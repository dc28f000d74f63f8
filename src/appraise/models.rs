use serde::{Deserialize, Serialize};

/// Part category of a listing. Unknown strings deserialize to `Other`,
/// which takes the documented default demand factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    Engine,
    Suspension,
    Transmission,
    Brakes,
    Rims,
    Tires,
    Exhaust,
    Chassis,
    Audio,
    #[serde(other)]
    Other,
}

impl PartCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartCategory::Engine => "engine",
            PartCategory::Suspension => "suspension",
            PartCategory::Transmission => "transmission",
            PartCategory::Brakes => "brakes",
            PartCategory::Rims => "rims",
            PartCategory::Tires => "tires",
            PartCategory::Exhaust => "exhaust",
            PartCategory::Chassis => "chassis",
            PartCategory::Audio => "audio",
            PartCategory::Other => "other",
        }
    }
}

/// Declared condition. Unknown strings deserialize to `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartCondition {
    New,
    Used,
    Aftermarket,
    #[serde(other)]
    #[default]
    Unspecified,
}

/// Age band a part falls into once its age is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "new_0_1")]
    New01,
    #[serde(rename = "years_1_3")]
    Years1To3,
    #[serde(rename = "years_3_7")]
    Years3To7,
    #[serde(rename = "years_7_15")]
    Years7To15,
    #[serde(rename = "years_15_plus")]
    Years15Plus,
}

impl AgeBand {
    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::New01 => "new_0_1",
            AgeBand::Years1To3 => "years_1_3",
            AgeBand::Years3To7 => "years_3_7",
            AgeBand::Years7To15 => "years_7_15",
            AgeBand::Years15Plus => "years_15_plus",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            AgeBand::New01 => 0,
            AgeBand::Years1To3 => 1,
            AgeBand::Years3To7 => 2,
            AgeBand::Years7To15 => 3,
            AgeBand::Years15Plus => 4,
        }
    }
}

/// OEM vs. performance aftermarket, used to pick the age-decay row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Oem,
    Performance,
}

/// Everything the scoring core needs about one listing. Assembled once per
/// request by the pipeline; never mutated afterwards.
///
/// Numeric fields are expected to be sanitized by the caller: prices are
/// finite and positive or absent, `current_year` is the caller's clock year
/// (passed in so the core stays a pure function of its input).
#[derive(Debug, Clone, PartialEq)]
pub struct ListingContext {
    pub title: Option<String>,
    pub category: PartCategory,
    pub condition: PartCondition,
    pub price: Option<f64>,
    pub part_year: Option<i32>,
    pub engine_miles: Option<u32>,
    pub is_marketplace_source: bool,
    pub distance_miles: f64,
    pub seller_tenure_months: u32,
    pub source_fetched: bool,
    pub has_buyer_geo: bool,
    pub current_year: i32,
}

/// Classification of an ask price against the estimated market mid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSignal {
    #[serde(rename = "Under market")]
    UnderMarket,
    #[serde(rename = "At market")]
    AtMarket,
    #[serde(rename = "Over market")]
    OverMarket,
}

impl PriceSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSignal::UnderMarket => "Under market",
            PriceSignal::AtMarket => "At market",
            PriceSignal::OverMarket => "Over market",
        }
    }
}

/// Estimated fair-market-value range in whole USD.
///
/// Invariant: `low < mid < high`; `low = round(mid * 0.88)` and
/// `high = round(mid * 1.18)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRange {
    pub low: i64,
    pub mid: i64,
    pub high: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub base_anchor: f64,
    pub age_band: AgeBand,
    pub age_factor: f64,
    pub condition_factor: f64,
    pub availability_factor: f64,
    pub demand_factor: f64,
    pub market_range: MarketRange,
    pub fair_market_value: i64,
    pub price_signal: PriceSignal,
}

/// The six normalized signals feeding the composite score, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub price_norm: f64,
    pub rep_norm: f64,
    pub demand_norm: f64,
    pub distance_norm: f64,
    pub tenure_norm: f64,
    pub confidence_norm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceResult {
    pub score_inputs: ScoreInputs,
    /// Composite trust/deal score, 1.0–10.0, one decimal.
    pub score10: f64,
    /// Advisory warnings in a fixed evaluation order. Text only; the flags
    /// never feed back into `score10`.
    pub risk_flags: Vec<String>,
}

/// Full output of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    pub valuation: ValuationResult,
    pub intelligence: IntelligenceResult,
}
