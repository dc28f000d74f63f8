//! Valuation factor derivation: age band, age/condition/availability/demand
//! multipliers, and the engine-mileage haircut.

use crate::appraise::models::{AgeBand, ListingContext, PartCategory, PartCondition, PartType};
use once_cell::sync::Lazy;
use regex::Regex;

// Age decay per band, OEM vs. performance aftermarket. Performance parts
// shed value faster once they leave the first band.
const AGE_FACTORS_OEM: [f64; 5] = [1.0, 0.92, 0.85, 0.75, 0.65];
const AGE_FACTORS_PERFORMANCE: [f64; 5] = [1.0, 0.90, 0.80, 0.68, 0.55];

const ENGINE_MILEAGE_TIERS: &[(u32, f64)] = &[
    (30_000, 1.0),
    (60_000, 0.95),
    (100_000, 0.88),
    (150_000, 0.78),
];
const ENGINE_MILEAGE_FLOOR: f64 = 0.68;

static NEW_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:new|sealed|unused)\b").expect("new keyword regex"));
static VINTAGE_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"15\s*\+|\bvintage\b|\bclassic\b|\bnla\b").expect("vintage regex"));
static RANGE_7_15: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"7\s*[-–]\s*15\s*(?:years?|yrs?)").expect("7-15 regex"));
static RANGE_3_7: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"3\s*[-–]\s*7\s*(?:years?|yrs?)").expect("3-7 regex"));
static RANGE_1_3: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"1\s*[-–]\s*3\s*(?:years?|yrs?)").expect("1-3 regex"));
static YEARS_OLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*(?:years?|yrs?)\s*old").expect("years-old regex"));

pub fn part_type(condition: PartCondition) -> PartType {
    match condition {
        PartCondition::Aftermarket => PartType::Performance,
        _ => PartType::Oem,
    }
}

/// Infer the age band: an explicit manufacture year wins, then best-effort
/// keyword/range sniffing over the title, then a per-condition default.
pub fn age_band(ctx: &ListingContext) -> AgeBand {
    if let Some(year) = ctx.part_year {
        return age_band_from_year(year, ctx.current_year);
    }
    if let Some(title) = ctx.title.as_deref()
        && let Some(band) = age_band_from_title(title)
    {
        return band;
    }
    match ctx.condition {
        PartCondition::Aftermarket => AgeBand::Years1To3,
        PartCondition::Used => AgeBand::Years7To15,
        PartCondition::New => AgeBand::New01,
        PartCondition::Unspecified => AgeBand::Years3To7,
    }
}

fn age_band_from_year(part_year: i32, current_year: i32) -> AgeBand {
    let age = (current_year - part_year).clamp(0, 80);
    match age {
        0..=1 => AgeBand::New01,
        2..=3 => AgeBand::Years1To3,
        4..=7 => AgeBand::Years3To7,
        8..=15 => AgeBand::Years7To15,
        _ => AgeBand::Years15Plus,
    }
}

/// Title sniffing, checked in a fixed priority order. Best-effort only; the
/// explicit year path above is authoritative when present.
fn age_band_from_title(title: &str) -> Option<AgeBand> {
    let haystack = title.to_lowercase();
    if NEW_KEYWORDS.is_match(&haystack) {
        return Some(AgeBand::New01);
    }
    if VINTAGE_KEYWORDS.is_match(&haystack) {
        return Some(AgeBand::Years15Plus);
    }
    if RANGE_7_15.is_match(&haystack) {
        return Some(AgeBand::Years7To15);
    }
    if RANGE_3_7.is_match(&haystack) {
        return Some(AgeBand::Years3To7);
    }
    if RANGE_1_3.is_match(&haystack) {
        return Some(AgeBand::Years1To3);
    }
    if let Some(caps) = YEARS_OLD.captures(&haystack)
        && let Ok(years) = caps[1].parse::<u32>()
    {
        return Some(match years {
            0 => AgeBand::New01,
            1..=3 => AgeBand::Years1To3,
            4..=7 => AgeBand::Years3To7,
            8..=15 => AgeBand::Years7To15,
            _ => AgeBand::Years15Plus,
        });
    }
    None
}

pub fn age_factor(part_type: PartType, band: AgeBand) -> f64 {
    let table = match part_type {
        PartType::Oem => &AGE_FACTORS_OEM,
        PartType::Performance => &AGE_FACTORS_PERFORMANCE,
    };
    table[band.index()]
}

/// Condition multiplier, including the engine-mileage haircut when it
/// applies. Rounded to 3 decimals.
pub fn condition_factor(ctx: &ListingContext) -> f64 {
    let base = match ctx.condition {
        PartCondition::New => 1.0,
        PartCondition::Aftermarket => 0.75,
        PartCondition::Used => 0.65,
        PartCondition::Unspecified => 0.8,
    };
    round3(base * engine_mileage_factor(ctx))
}

/// Mileage only discounts engines that have actually run: category must be
/// Engine, condition not New, and the odometer known. A missing odometer is
/// not penalized here; it surfaces as a risk flag instead.
pub fn engine_mileage_factor(ctx: &ListingContext) -> f64 {
    if ctx.category != PartCategory::Engine || ctx.condition == PartCondition::New {
        return 1.0;
    }
    let Some(miles) = ctx.engine_miles else {
        return 1.0;
    };
    for (limit, factor) in ENGINE_MILEAGE_TIERS {
        if miles <= *limit {
            return *factor;
        }
    }
    ENGINE_MILEAGE_FLOOR
}

pub fn availability_factor(is_marketplace_source: bool) -> f64 {
    if is_marketplace_source { 1.1 } else { 1.0 }
}

pub fn demand_factor(category: PartCategory) -> f64 {
    match category {
        PartCategory::Engine | PartCategory::Brakes => 1.1,
        PartCategory::Transmission | PartCategory::Rims | PartCategory::Exhaust => 1.05,
        PartCategory::Suspension | PartCategory::Tires | PartCategory::Chassis => 1.0,
        PartCategory::Audio => 0.95,
        PartCategory::Other => 1.0,
    }
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ListingContext {
        ListingContext {
            title: None,
            category: PartCategory::Brakes,
            condition: PartCondition::Used,
            price: None,
            part_year: None,
            engine_miles: None,
            is_marketplace_source: false,
            distance_miles: 10.0,
            seller_tenure_months: 24,
            source_fetched: false,
            has_buyer_geo: false,
            current_year: 2026,
        }
    }

    #[test]
    fn year_buckets_respect_band_edges() {
        let cases = [
            (2026, AgeBand::New01),
            (2025, AgeBand::New01),
            (2024, AgeBand::Years1To3),
            (2023, AgeBand::Years1To3),
            (2022, AgeBand::Years3To7),
            (2019, AgeBand::Years3To7),
            (2018, AgeBand::Years7To15),
            (2011, AgeBand::Years7To15),
            (2010, AgeBand::Years15Plus),
            (1950, AgeBand::Years15Plus),
        ];
        for (year, expected) in cases {
            let mut c = ctx();
            c.part_year = Some(year);
            assert_eq!(age_band(&c), expected, "year {year}");
        }
    }

    #[test]
    fn future_year_clamps_to_new() {
        let mut c = ctx();
        c.part_year = Some(2030);
        assert_eq!(age_band(&c), AgeBand::New01);
    }

    #[test]
    fn title_inference_priority_order() {
        // Each case exercises one rung of the priority ladder; earlier rungs
        // must win even when later patterns also match.
        let cases = [
            ("sealed in box, 10 years old", AgeBand::New01),
            ("vintage unit, 1-3 years on rebuild", AgeBand::Years15Plus),
            ("NLA bracket", AgeBand::Years15Plus),
            ("7-15 years wear, 1-3 years on seals", AgeBand::Years7To15),
            ("3-7 years of use", AgeBand::Years3To7),
            ("1-3 yrs old set", AgeBand::Years1To3),
            ("about 12 years old", AgeBand::Years7To15),
            ("5 years old shocks", AgeBand::Years3To7),
            ("2 years old", AgeBand::Years1To3),
        ];
        for (title, expected) in cases {
            let mut c = ctx();
            c.title = Some(title.to_string());
            assert_eq!(age_band(&c), expected, "title {title:?}");
        }
    }

    #[test]
    fn condition_fallback_when_title_says_nothing() {
        let cases = [
            (PartCondition::Aftermarket, AgeBand::Years1To3),
            (PartCondition::Used, AgeBand::Years7To15),
            (PartCondition::New, AgeBand::New01),
            (PartCondition::Unspecified, AgeBand::Years3To7),
        ];
        for (condition, expected) in cases {
            let mut c = ctx();
            c.title = Some("master cylinder".to_string());
            c.condition = condition;
            assert_eq!(age_band(&c), expected, "condition {condition:?}");
        }
    }

    #[test]
    fn age_factor_endpoints() {
        assert_eq!(age_factor(PartType::Oem, AgeBand::New01), 1.0);
        assert_eq!(age_factor(PartType::Performance, AgeBand::New01), 1.0);
        assert_eq!(age_factor(PartType::Performance, AgeBand::Years15Plus), 0.55);
        // Performance never beats OEM outside the new band.
        for band in [
            AgeBand::Years1To3,
            AgeBand::Years3To7,
            AgeBand::Years7To15,
            AgeBand::Years15Plus,
        ] {
            assert!(age_factor(PartType::Performance, band) < age_factor(PartType::Oem, band));
        }
    }

    #[test]
    fn engine_mileage_tiers() {
        let cases = [
            (25_000, 1.0),
            (30_000, 1.0),
            (30_001, 0.95),
            (60_000, 0.95),
            (99_999, 0.88),
            (150_000, 0.78),
            (150_001, 0.68),
        ];
        for (miles, expected) in cases {
            let mut c = ctx();
            c.category = PartCategory::Engine;
            c.engine_miles = Some(miles);
            assert_eq!(engine_mileage_factor(&c), expected, "{miles} miles");
        }
    }

    #[test]
    fn mileage_ignored_outside_running_engines() {
        let mut c = ctx();
        c.engine_miles = Some(200_000);
        // Not an engine.
        assert_eq!(engine_mileage_factor(&c), 1.0);
        c.category = PartCategory::Engine;
        c.condition = PartCondition::New;
        assert_eq!(engine_mileage_factor(&c), 1.0);
        // Engine, used, but odometer unknown: no haircut here.
        c.condition = PartCondition::Used;
        c.engine_miles = None;
        assert_eq!(engine_mileage_factor(&c), 1.0);
    }

    #[test]
    fn condition_factor_rounds_to_three_decimals() {
        let mut c = ctx();
        c.category = PartCategory::Engine;
        c.condition = PartCondition::Used;
        c.engine_miles = Some(140_000);
        assert_eq!(condition_factor(&c), 0.507); // 0.65 * 0.78
        c.engine_miles = Some(80_000);
        assert_eq!(condition_factor(&c), 0.572); // 0.65 * 0.88
    }

    #[test]
    fn demand_table() {
        assert_eq!(demand_factor(PartCategory::Engine), 1.1);
        assert_eq!(demand_factor(PartCategory::Brakes), 1.1);
        assert_eq!(demand_factor(PartCategory::Transmission), 1.05);
        assert_eq!(demand_factor(PartCategory::Rims), 1.05);
        assert_eq!(demand_factor(PartCategory::Exhaust), 1.05);
        assert_eq!(demand_factor(PartCategory::Suspension), 1.0);
        assert_eq!(demand_factor(PartCategory::Tires), 1.0);
        assert_eq!(demand_factor(PartCategory::Chassis), 1.0);
        assert_eq!(demand_factor(PartCategory::Audio), 0.95);
        assert_eq!(demand_factor(PartCategory::Other), 1.0);
    }

    #[test]
    fn availability_bonus_for_marketplace_sources() {
        assert_eq!(availability_factor(true), 1.1);
        assert_eq!(availability_factor(false), 1.0);
    }
}
