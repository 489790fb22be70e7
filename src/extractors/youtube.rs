use regex::Regex;
use std::sync::OnceLock;

use crate::TranscriptError;

/// Short-lived credentials embedded in a watch page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTokens {
    /// Key passed to the internal transcript endpoint
    pub api_key: String,

    /// Web client version the endpoint expects in the request context
    pub client_version: String,
}

fn api_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""INNERTUBE_API_KEY":"([^"]+)""#).expect("api key pattern is valid"))
}

fn client_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""clientVersion":"([^"]+)""#).expect("client version pattern is valid"))
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the `INNERTUBE_API_KEY` value in the page markup
pub fn extract_api_key(html: &str) -> Result<String, TranscriptError> {
    first_capture(api_key_regex(), html).ok_or(TranscriptError::MissingApiKey)
}

/// Find the first `clientVersion` value in the page markup
pub fn extract_client_version(html: &str) -> Result<String, TranscriptError> {
    first_capture(client_version_regex(), html).ok_or(TranscriptError::MissingClientVersion)
}

/// Scrape both tokens; either one missing aborts the whole request
pub fn scrape_page_tokens(html: &str) -> Result<PageTokens, TranscriptError> {
    let api_key = extract_api_key(html)?;
    tracing::debug!("Found API key");

    let client_version = extract_client_version(html)?;
    tracing::debug!(client_version = %client_version, "Found client version");

    Ok(PageTokens {
        api_key,
        client_version,
    })
}
