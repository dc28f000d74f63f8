use reqwest::Client;
use std::time::Duration;

/// Shared outbound client. Fetches must stay bounded: a hung remote page
/// degrades scoring confidence, it never hangs the request.
pub fn build_client() -> Client {
    let timeout = std::env::var("METADATA_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(7);
    let connect = std::env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(5);
    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .connect_timeout(Duration::from_secs(connect))
        .build()
        .unwrap_or_else(|_| Client::new())
}
