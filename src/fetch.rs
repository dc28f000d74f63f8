//! Listing-metadata retrieval.
//!
//! Best-effort scrape of a listing URL: page title, a dollar price, and a
//! coarse location string. The fetcher never fails — timeouts, non-2xx
//! responses, and parse misses all come back as `fetched = false`, which
//! the scorer absorbs as reduced confidence.

use crate::http::build_client;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_with::skip_serializing_none;
use tracing::warn;

const KNOWN_MARKETPLACE_HOSTS: &[&str] = &[
    "craigslist.org",
    "facebook.com",
    "ebay.com",
    "offerup.com",
    "mercari.com",
    "kijiji.ca",
    "gumtree.com",
    "car-part.com",
];

static OG_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']+)["']"#)
        .expect("og:title regex")
});
static HTML_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex"));
static DOLLAR_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s*([0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.([0-9]{2}))?").expect("price regex")
});
static JSONLD_LOCALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""addressLocality"\s*:\s*"([^"]+)""#).expect("locality regex")
});
static GEO_PLACENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]+name=["']geo\.placename["'][^>]+content=["']([^"']+)["']"#)
        .expect("placename regex")
});

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingMetadata {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub location_text: Option<String>,
    pub platform_known: bool,
    pub fetched: bool,
}

impl ListingMetadata {
    pub fn unavailable(platform_known: bool) -> Self {
        Self {
            title: None,
            price: None,
            location_text: None,
            platform_known,
            fetched: false,
        }
    }
}

pub struct MetadataFetcher {
    http: Client,
}

impl MetadataFetcher {
    pub fn from_env() -> Self {
        Self {
            http: build_client(),
        }
    }

    /// Fetch and scrape a listing page. Resolves, never rejects.
    pub async fn fetch(&self, url: &str) -> ListingMetadata {
        let platform_known = platform_known(url);
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(target = "partscout.fetch", url = url, error = %err, "metadata_fetch_failed");
                return ListingMetadata::unavailable(platform_known);
            }
        };
        if !response.status().is_success() {
            warn!(
                target = "partscout.fetch",
                url = url,
                status = %response.status(),
                "metadata_fetch_non_success"
            );
            return ListingMetadata::unavailable(platform_known);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(target = "partscout.fetch", url = url, error = %err, "metadata_body_unreadable");
                return ListingMetadata::unavailable(platform_known);
            }
        };

        ListingMetadata {
            title: extract_title(&body),
            price: extract_price(&body),
            location_text: extract_location(&body),
            platform_known,
            fetched: true,
        }
    }
}

/// Whether the URL's host belongs to a recognized marketplace. The builtin
/// list can be extended via `MARKETPLACE_DOMAINS` (comma separated).
pub fn platform_known(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();
    let extra = std::env::var("MARKETPLACE_DOMAINS").unwrap_or_default();
    KNOWN_MARKETPLACE_HOSTS
        .iter()
        .copied()
        .chain(extra.split(',').map(str::trim).filter(|s| !s.is_empty()))
        .any(|domain| host == domain || host.ends_with(&format!(".{domain}")))
}

pub(crate) fn extract_title(html: &str) -> Option<String> {
    let raw = OG_TITLE
        .captures(html)
        .or_else(|| HTML_TITLE.captures(html))
        .map(|caps| caps[1].to_string())?;
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

pub(crate) fn extract_price(text: &str) -> Option<f64> {
    let caps = DOLLAR_PRICE.captures(text)?;
    let whole: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    let cents = caps.get(2).map(|m| m.as_str()).unwrap_or("0");
    let value: f64 = format!("{whole}.{cents}").parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

pub(crate) fn extract_location(html: &str) -> Option<String> {
    JSONLD_LOCALITY
        .captures(html)
        .or_else(|| GEO_PLACENAME.captures(html))
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_matching_covers_subdomains() {
        assert!(platform_known("https://losangeles.craigslist.org/pts/d/engine/77.html"));
        assert!(platform_known("https://www.ebay.com/itm/1234"));
        assert!(!platform_known("https://shadyparts.example/listing/9"));
        assert!(!platform_known("not a url"));
    }

    #[test]
    fn title_prefers_og_over_title_tag() {
        let html = r#"<head>
            <title>fallback title</title>
            <meta property="og:title" content="B58 long block, 42k miles" />
        </head>"#;
        assert_eq!(
            extract_title(html).as_deref(),
            Some("B58 long block, 42k miles")
        );
        assert_eq!(
            extract_title("<title>  spaced   out </title>").as_deref(),
            Some("spaced out")
        );
        assert!(extract_title("<p>no titles here</p>").is_none());
    }

    #[test]
    fn price_extraction_handles_commas_and_cents() {
        assert_eq!(extract_price("asking $1,250 obo"), Some(1250.0));
        assert_eq!(extract_price("<b>$89.99</b>"), Some(89.99));
        assert_eq!(extract_price("price: $0"), None);
        assert_eq!(extract_price("no dollars"), None);
    }

    #[test]
    fn location_from_jsonld_then_meta() {
        let jsonld = r#"{"address":{"addressLocality":"Portland","addressRegion":"OR"}}"#;
        assert_eq!(extract_location(jsonld).as_deref(), Some("Portland"));
        let meta = r#"<meta name="geo.placename" content="Seattle">"#;
        assert_eq!(extract_location(meta).as_deref(), Some("Seattle"));
        assert!(extract_location("<div></div>").is_none());
    }
}
