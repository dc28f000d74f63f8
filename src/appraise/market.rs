//! FMV estimation and price-signal classification.

use crate::appraise::factors;
use crate::appraise::models::{ListingContext, MarketRange, PriceSignal, ValuationResult};

const DEFAULT_ANCHOR: f64 = 300.0;
const ANCHOR_FLOOR: f64 = 50.0;

/// Estimate the fair-market-value range for a listing and classify its ask
/// price against it. Pure arithmetic over table lookups; cannot fail.
pub fn appraise(ctx: &ListingContext) -> ValuationResult {
    let band = factors::age_band(ctx);
    let age_factor = factors::age_factor(factors::part_type(ctx.condition), band);
    let condition_factor = factors::condition_factor(ctx);
    let availability_factor = factors::availability_factor(ctx.is_marketplace_source);
    let demand_factor = factors::demand_factor(ctx.category);

    let base_anchor = ctx.price.unwrap_or(DEFAULT_ANCHOR).max(ANCHOR_FLOOR);
    let mid = round_usd(
        base_anchor * age_factor * condition_factor * availability_factor * demand_factor,
    );
    let market_range = MarketRange {
        low: round_usd(mid as f64 * 0.88),
        mid,
        high: round_usd(mid as f64 * 1.18),
    };

    ValuationResult {
        base_anchor,
        age_band: band,
        age_factor,
        condition_factor,
        availability_factor,
        demand_factor,
        price_signal: classify_price(ctx.price, mid),
        fair_market_value: mid,
        market_range,
    }
}

/// A missing ask price reads as neutral, not unknown, so an absent price
/// cannot drag the composite score either way.
fn classify_price(price: Option<f64>, mid: i64) -> PriceSignal {
    let Some(price) = price else {
        return PriceSignal::AtMarket;
    };
    let mid = mid as f64;
    if price < mid * 0.9 {
        PriceSignal::UnderMarket
    } else if price > mid * 1.1 {
        PriceSignal::OverMarket
    } else {
        PriceSignal::AtMarket
    }
}

fn round_usd(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appraise::models::{AgeBand, PartCategory, PartCondition};

    fn ctx() -> ListingContext {
        ListingContext {
            title: None,
            category: PartCategory::Brakes,
            condition: PartCondition::New,
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
    fn new_brake_kit_without_price_anchors_at_default() {
        let mut c = ctx();
        c.title = Some("Brembo GT kit".to_string());
        let v = appraise(&c);
        assert_eq!(v.age_band, AgeBand::New01);
        assert_eq!(v.age_factor, 1.0);
        assert_eq!(v.condition_factor, 1.0);
        assert_eq!(v.demand_factor, 1.1);
        assert_eq!(v.base_anchor, 300.0);
        // 300 * 1.0 * 1.0 * 1.0 * 1.1
        assert_eq!(v.market_range.mid, 330);
        assert_eq!(v.market_range.low, 290);
        assert_eq!(v.market_range.high, 389);
        assert_eq!(v.price_signal, PriceSignal::AtMarket);
    }

    #[test]
    fn marketplace_source_lifts_the_mid() {
        let mut c = ctx();
        c.is_marketplace_source = true;
        let v = appraise(&c);
        assert_eq!(v.availability_factor, 1.1);
        assert_eq!(v.market_range.mid, 363); // 300 * 1.1 * 1.1
    }

    #[test]
    fn tiny_prices_clamp_to_the_anchor_floor() {
        let mut c = ctx();
        c.price = Some(10.0);
        let v = appraise(&c);
        assert_eq!(v.base_anchor, 50.0);
    }

    #[test]
    fn used_engine_mid_reflects_mileage_haircut() {
        let mut c = ctx();
        c.category = PartCategory::Engine;
        c.condition = PartCondition::Used;
        c.engine_miles = Some(140_000);
        c.price = Some(600.0);
        let v = appraise(&c);
        assert_eq!(v.condition_factor, 0.507);
        assert_eq!(v.age_factor, 0.75); // used fallback band, OEM row
        // 600 * 0.75 * 0.507 * 1.0 * 1.1 = 250.965
        assert_eq!(v.market_range.mid, 251);
        assert_eq!(v.price_signal, PriceSignal::OverMarket);
    }

    #[test]
    fn price_signal_boundaries() {
        // mid computes to 330 for this context regardless of small ask shifts?
        // No: the ask feeds the anchor, so pin mid per case instead.
        let mid = 200;
        assert_eq!(classify_price(Some(179.0), mid), PriceSignal::UnderMarket);
        assert_eq!(classify_price(Some(180.0), mid), PriceSignal::AtMarket);
        assert_eq!(classify_price(Some(220.0), mid), PriceSignal::AtMarket);
        assert_eq!(classify_price(Some(220.1), mid), PriceSignal::OverMarket);
        assert_eq!(classify_price(None, mid), PriceSignal::AtMarket);
    }

    #[test]
    fn range_is_strictly_ordered_and_non_negative() {
        let categories = [
            PartCategory::Engine,
            PartCategory::Suspension,
            PartCategory::Transmission,
            PartCategory::Brakes,
            PartCategory::Rims,
            PartCategory::Tires,
            PartCategory::Exhaust,
            PartCategory::Chassis,
            PartCategory::Audio,
        ];
        let conditions = [
            PartCondition::New,
            PartCondition::Used,
            PartCondition::Aftermarket,
            PartCondition::Unspecified,
        ];
        for category in categories {
            for condition in conditions {
                for price in [None, Some(55.0), Some(120.0), Some(480.0), Some(9_500.0)] {
                    for miles in [None, Some(20_000), Some(90_000), Some(210_000)] {
                        let mut c = ctx();
                        c.category = category;
                        c.condition = condition;
                        c.price = price;
                        c.engine_miles = miles;
                        let v = appraise(&c);
                        let r = v.market_range;
                        assert!(r.low >= 0, "{category:?}/{condition:?}: low {}", r.low);
                        assert!(
                            r.low < r.mid && r.mid < r.high,
                            "{category:?}/{condition:?}/{price:?}/{miles:?}: {r:?}"
                        );
                        assert_eq!(v.fair_market_value, r.mid);
                    }
                }
            }
        }
    }
}
