//! Composite trust/deal scoring and risk-flag generation.
//!
//! Six signals are normalized into [0, 1], blended with fixed weights, then
//! an overpricing penalty is applied on top. Flags are advisory text in a
//! fixed evaluation order and never feed back into the number.

use crate::appraise::brand::BrandRecord;
use crate::appraise::models::{
    IntelligenceResult, ListingContext, PartCategory, PartCondition, PriceSignal, ScoreInputs,
    ValuationResult,
};

const WEIGHT_REPUTATION: f64 = 0.20;
const WEIGHT_DEMAND: f64 = 0.12;
const WEIGHT_DISTANCE: f64 = 0.12;
const WEIGHT_TENURE: f64 = 0.14;
const WEIGHT_PRICE_FIT: f64 = 0.32;
const WEIGHT_CONFIDENCE: f64 = 0.10;

const NEUTRAL_PRICE_NORM: f64 = 0.62;
const HIGH_MILEAGE_MILES: u32 = 120_000;
const LOW_SIGNAL_VOLUME: u32 = 200;

/// Assess one listing against its valuation. Pure; cannot fail.
pub fn assess(
    ctx: &ListingContext,
    brand: &BrandRecord,
    valuation: &ValuationResult,
) -> IntelligenceResult {
    let inputs = score_inputs(ctx, brand, valuation);
    let score10 = composite_score(ctx, valuation, &inputs);
    let risk_flags = risk_flags(ctx, brand, valuation);
    IntelligenceResult {
        score_inputs: inputs,
        score10,
        risk_flags,
    }
}

fn score_inputs(
    ctx: &ListingContext,
    brand: &BrandRecord,
    valuation: &ValuationResult,
) -> ScoreInputs {
    let mid = valuation.market_range.mid;
    let price_norm = match ctx.price {
        Some(price) if mid > 0 => {
            let mid = mid as f64;
            (1.0 - ((price - mid).abs() / mid)).clamp(0.2, 1.0)
        }
        _ => NEUTRAL_PRICE_NORM,
    };

    let mut confidence: f64 = 0.55;
    if ctx.source_fetched {
        confidence += 0.20;
    }
    if ctx.price.is_some() {
        confidence += 0.15;
    }
    if ctx.title.is_some() {
        confidence += 0.05;
    }
    if ctx.has_buyer_geo {
        confidence += 0.05;
    }

    ScoreInputs {
        price_norm,
        rep_norm: ((brand.score5 - 3.5) / 1.5).clamp(0.0, 1.0),
        demand_norm: ((valuation.demand_factor - 0.85) / 0.35).clamp(0.0, 1.0),
        distance_norm: (1.0 - ctx.distance_miles / 220.0).clamp(0.0, 1.0),
        tenure_norm: (ctx.seller_tenure_months as f64 / 24.0).clamp(0.0, 1.0),
        confidence_norm: confidence.clamp(0.35, 1.0),
    }
}

fn composite_score(ctx: &ListingContext, valuation: &ValuationResult, inputs: &ScoreInputs) -> f64 {
    let weighted = inputs.rep_norm * WEIGHT_REPUTATION
        + inputs.demand_norm * WEIGHT_DEMAND
        + inputs.distance_norm * WEIGHT_DISTANCE
        + inputs.tenure_norm * WEIGHT_TENURE
        + inputs.price_norm * WEIGHT_PRICE_FIT
        + inputs.confidence_norm * WEIGHT_CONFIDENCE;

    let mut score = (weighted.clamp(0.1, 1.0) * 100.0).round() / 10.0;

    // Overpricing must dominate: good reputation, demand, or proximity
    // cannot rescue a listing priced far above its estimated value.
    if let Some(price) = ctx.price {
        let mid = valuation.market_range.mid;
        if mid > 0 {
            let ratio = price / mid as f64;
            if ratio > 1.0 {
                score -= ((ratio - 1.0) * 4.5).min(3.5);
            }
            if price > valuation.market_range.high as f64 {
                score = score.min(4.8);
            }
            if ratio >= 1.35 {
                score = score.min(3.8);
            }
            if ratio >= 1.6 {
                score = score.min(2.8);
            }
        }
    }

    ((score * 10.0).round() / 10.0).clamp(1.0, 10.0)
}

fn risk_flags(ctx: &ListingContext, brand: &BrandRecord, valuation: &ValuationResult) -> Vec<String> {
    let mut flags = Vec::new();

    // Platform cautions lead the list.
    if !ctx.is_marketplace_source {
        flags.push(
            "Unrecognized platform: verify the listing source independently before contacting the seller."
                .to_string(),
        );
    }
    if !ctx.source_fetched {
        flags.push(
            "Source page was not verified live; treat listing details as unconfirmed.".to_string(),
        );
    }

    if ctx.seller_tenure_months < 6 {
        flags.push(
            "Seller account is less than 6 months old; meet in a public place and verify identity."
                .to_string(),
        );
    }
    if ctx.distance_miles > 90.0 {
        flags.push(
            "Pickup distance exceeds 90 miles; factor travel cost and inspect before committing."
                .to_string(),
        );
    }
    match valuation.price_signal {
        PriceSignal::UnderMarket => flags.push(
            "Priced well under market: confirm authenticity and ask why before paying.".to_string(),
        ),
        PriceSignal::OverMarket => flags.push(
            "Over market: the ask exceeds the estimated fair range; negotiate or compare alternatives."
                .to_string(),
        ),
        PriceSignal::AtMarket => {}
    }
    if let Some(price) = ctx.price {
        let mid = valuation.market_range.mid;
        if mid > 0 && ((price - mid as f64).abs() / mid as f64) > 0.35 {
            flags.push(
                "Ask price deviates more than 35% from the estimated value; re-check part number and fitment."
                    .to_string(),
            );
        }
    }
    if ctx.condition == PartCondition::Used {
        flags.push(
            "Used part: request serials, casting numbers, and service history before purchase."
                .to_string(),
        );
    }
    if ctx.category == PartCategory::Engine {
        match ctx.engine_miles {
            None => flags.push(
                "Engine mileage not stated; request odometer or service records before valuing internals."
                    .to_string(),
            ),
            Some(miles) if miles >= HIGH_MILEAGE_MILES => flags.push(
                "High engine mileage (120k+); budget for compression testing and wear items."
                    .to_string(),
            ),
            Some(_) => {}
        }
    }
    if brand.verified_signals < LOW_SIGNAL_VOLUME {
        flags.push(
            "Few verified signals back this brand; counterfeit risk is elevated for boutique labels."
                .to_string(),
        );
    }

    flags
}
