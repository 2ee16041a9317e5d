// src/job_monitor/url_builder.rs
use tracing::info;

/// Build the job board search URL.
///
/// Spaces become `+`; no other encoding is applied.
pub fn build_search_url(board_url: &str, keywords: &str, location: &str) -> String {
    let url = format!(
        "{}/jobs?q={}&l={}",
        board_url.trim_end_matches('/'),
        keywords.replace(' ', "+"),
        location.replace(' ', "+")
    );
    info!("Built search URL: {}", url);
    url
}
