//! The valuation/scoring core.
//!
//! Every function here is a pure, synchronous computation over a
//! [`ListingContext`]; there is no I/O, no shared state, and no failure
//! path. Callers may invoke these concurrently without coordination.

pub mod brand;
pub mod factors;
pub mod intelligence;
pub mod market;
pub mod models;
pub mod signals;

pub use brand::BrandRecord;
pub use models::{
    Appraisal, IntelligenceResult, ListingContext, PartCategory, PartCondition, PriceSignal,
    ValuationResult,
};
pub use signals::{HashSignalSource, SignalSource, SimulatedSignals};

/// Score one listing: the single logical operation the core exposes.
pub fn score(ctx: &ListingContext) -> Appraisal {
    let valuation = market::appraise(ctx);
    let record = brand::resolve(ctx.title.as_deref());
    let intelligence = intelligence::assess(ctx, record, &valuation);
    Appraisal {
        valuation,
        intelligence,
    }
}
