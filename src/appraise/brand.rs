//! Brand reputation lookup.
//!
//! Titles are matched against a fixed table of known brand keys by lowercase
//! substring, in declaration order, first match wins. Anything unmatched
//! resolves to the generic `"oem"` record, so resolution never fails.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrandRecord {
    pub key: &'static str,
    pub label: &'static str,
    /// Community reputation on a 1–5 scale.
    pub score5: f64,
    /// Count of verified transactions/reviews backing the score.
    pub verified_signals: u32,
}

pub const DEFAULT_BRAND: BrandRecord = BrandRecord {
    key: "oem",
    label: "OEM / unbranded",
    score5: 4.8,
    verified_signals: 3200,
};

pub const BRAND_TABLE: &[BrandRecord] = &[
    BrandRecord { key: "brembo", label: "Brembo", score5: 4.9, verified_signals: 8200 },
    BrandRecord { key: "bilstein", label: "Bilstein", score5: 4.8, verified_signals: 5100 },
    BrandRecord { key: "ohlins", label: "Öhlins", score5: 4.9, verified_signals: 2900 },
    BrandRecord { key: "eibach", label: "Eibach", score5: 4.7, verified_signals: 3400 },
    BrandRecord { key: "bosch", label: "Bosch", score5: 4.8, verified_signals: 9800 },
    BrandRecord { key: "denso", label: "Denso", score5: 4.7, verified_signals: 7600 },
    BrandRecord { key: "ngk", label: "NGK", score5: 4.8, verified_signals: 8900 },
    BrandRecord { key: "garrett", label: "Garrett", score5: 4.8, verified_signals: 2600 },
    BrandRecord { key: "borla", label: "Borla", score5: 4.7, verified_signals: 2300 },
    BrandRecord { key: "magnaflow", label: "MagnaFlow", score5: 4.6, verified_signals: 2800 },
    BrandRecord { key: "akrapovic", label: "Akrapovič", score5: 4.9, verified_signals: 1700 },
    BrandRecord { key: "mishimoto", label: "Mishimoto", score5: 4.6, verified_signals: 2500 },
    BrandRecord { key: "hks", label: "HKS", score5: 4.6, verified_signals: 1900 },
    BrandRecord { key: "greddy", label: "GReddy", score5: 4.5, verified_signals: 1450 },
    BrandRecord { key: "skunk2", label: "Skunk2", score5: 4.4, verified_signals: 760 },
    BrandRecord { key: "tein", label: "Tein", score5: 4.5, verified_signals: 1300 },
    BrandRecord { key: "moog", label: "Moog", score5: 4.4, verified_signals: 5200 },
    BrandRecord { key: "kyb", label: "KYB", score5: 4.5, verified_signals: 4100 },
    BrandRecord { key: "monroe", label: "Monroe", score5: 4.3, verified_signals: 3800 },
    BrandRecord { key: "enkei", label: "Enkei", score5: 4.6, verified_signals: 1800 },
    BrandRecord { key: "bbs", label: "BBS", score5: 4.8, verified_signals: 2200 },
    BrandRecord { key: "volk", label: "Volk Racing", score5: 4.8, verified_signals: 760 },
    BrandRecord { key: "rays", label: "Rays Engineering", score5: 4.8, verified_signals: 950 },
    BrandRecord { key: "konig", label: "König", score5: 4.3, verified_signals: 880 },
    BrandRecord { key: "michelin", label: "Michelin", score5: 4.9, verified_signals: 11200 },
    BrandRecord { key: "bridgestone", label: "Bridgestone", score5: 4.8, verified_signals: 9400 },
    BrandRecord { key: "continental", label: "Continental", score5: 4.7, verified_signals: 8100 },
    BrandRecord { key: "falken", label: "Falken", score5: 4.5, verified_signals: 3100 },
    BrandRecord { key: "pioneer", label: "Pioneer", score5: 4.5, verified_signals: 6400 },
    BrandRecord { key: "alpine", label: "Alpine", score5: 4.6, verified_signals: 5300 },
    BrandRecord { key: "jl audio", label: "JL Audio", score5: 4.7, verified_signals: 2400 },
    BrandRecord { key: "kicker", label: "Kicker", score5: 4.4, verified_signals: 3100 },
    BrandRecord { key: "dorman", label: "Dorman", score5: 4.2, verified_signals: 5600 },
    BrandRecord { key: "cardone", label: "Cardone", score5: 4.0, verified_signals: 2400 },
    BrandRecord { key: "depo", label: "Depo", score5: 3.8, verified_signals: 640 },
    BrandRecord { key: "megan racing", label: "Megan Racing", score5: 3.9, verified_signals: 180 },
    BrandRecord { key: "xforce", label: "XForce", score5: 4.1, verified_signals: 120 },
    BrandRecord { key: "spec-d", label: "Spec-D", score5: 3.7, verified_signals: 190 },
];

/// Resolve a listing title against the default brand table.
pub fn resolve(title: Option<&str>) -> &'static BrandRecord {
    resolve_in(BRAND_TABLE, title)
}

/// Resolve against an injected table. First declared key that appears as a
/// substring of the lowercased title wins; no title or no match falls back
/// to [`DEFAULT_BRAND`].
pub fn resolve_in<'a>(table: &'a [BrandRecord], title: Option<&str>) -> &'a BrandRecord {
    let Some(title) = title else {
        return &DEFAULT_BRAND;
    };
    let haystack = title.to_lowercase();
    table
        .iter()
        .find(|record| haystack.contains(record.key))
        .unwrap_or(&DEFAULT_BRAND)
}
