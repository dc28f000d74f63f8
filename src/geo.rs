//! ZIP-code geocoding and great-circle distance.
//!
//! Resolution is a static lookup over 3-digit ZIP prefix centroids: coarse,
//! offline, and good enough to estimate pickup distance. Misses return
//! `None`; nothing here can fail loudly.

use serde::Serialize;

const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

// (prefix, lat, lon) — metro-area centroids keyed by the first three ZIP
// digits. Declaration order is irrelevant; prefixes are unique.
const ZIP_PREFIX_CENTROIDS: &[(&str, f64, f64)] = &[
    ("021", 42.3601, -71.0589),  // Boston
    ("100", 40.7128, -74.0060),  // New York
    ("112", 40.6782, -73.9442),  // Brooklyn
    ("191", 39.9526, -75.1652),  // Philadelphia
    ("152", 40.4406, -79.9959),  // Pittsburgh
    ("208", 39.0840, -77.1528),  // Bethesda / DC suburbs
    ("303", 33.7490, -84.3880),  // Atlanta
    ("331", 25.7617, -80.1918),  // Miami
    ("328", 28.5384, -81.3789),  // Orlando
    ("372", 36.1627, -86.7816),  // Nashville
    ("432", 39.9612, -82.9988),  // Columbus
    ("441", 41.4993, -81.6944),  // Cleveland
    ("480", 42.5467, -83.2113),  // Detroit suburbs
    ("482", 42.3314, -83.0458),  // Detroit
    ("531", 43.0389, -87.9065),  // Milwaukee
    ("554", 44.9778, -93.2650),  // Minneapolis
    ("606", 41.8781, -87.6298),  // Chicago
    ("631", 38.6270, -90.1994),  // St. Louis
    ("750", 32.7767, -96.7970),  // Dallas
    ("770", 29.7604, -95.3698),  // Houston
    ("787", 30.2672, -97.7431),  // Austin
    ("802", 39.7392, -104.9903), // Denver
    ("841", 40.7608, -111.8910), // Salt Lake City
    ("850", 33.4484, -112.0740), // Phoenix
    ("891", 36.1699, -115.1398), // Las Vegas
    ("900", 34.0522, -118.2437), // Los Angeles
    ("902", 33.9164, -118.3526), // LA south bay
    ("920", 32.7157, -117.1611), // San Diego
    ("941", 37.7749, -122.4194), // San Francisco
    ("945", 37.8044, -122.2712), // Oakland / East Bay
    ("951", 37.3382, -121.8863), // San Jose
    ("972", 45.5152, -122.6784), // Portland
    ("981", 47.6062, -122.3321), // Seattle
];

/// Resolve a US ZIP to a coarse centroid. Accepts 5-digit or ZIP+4 input;
/// any malformed or unknown value resolves to `None`.
pub fn resolve(zip: &str) -> Option<GeoPoint> {
    let digits: String = zip.chars().filter(|c| c.is_ascii_digit()).take(5).collect();
    if digits.len() < 5 {
        return None;
    }
    let prefix = &digits[..3];
    ZIP_PREFIX_CENTROIDS
        .iter()
        .find(|(key, _, _)| *key == prefix)
        .map(|(_, lat, lon)| GeoPoint { lat: *lat, lon: *lon })
}

/// Haversine great-circle distance in miles.
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Distance between two ZIPs, when both resolve.
pub fn distance_between_zips(a: &str, b: &str) -> Option<f64> {
    Some(distance_miles(resolve(a)?, resolve(b)?))
}
