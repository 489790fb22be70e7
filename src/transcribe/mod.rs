use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use crate::config::UpstreamConfig;
use crate::extractors::{scrape_page_tokens, PageTokens, VideoId};
use crate::TranscriptError;

pub mod processor;
pub mod transport;

pub use transport::{HttpTransport, ReqwestTransport, UpstreamResponse};

/// Locale, region and client identity sent to the transcript endpoint
const CLIENT_LANGUAGE: &str = "en";
const CLIENT_REGION: &str = "US";
const CLIENT_NAME: &str = "WEB";
const CLIENT_SCREEN: &str = "WATCH";

const TRANSCRIPT_ENDPOINT_PATH: &str = "/youtubei/v1/get_transcript";

/// Individual transcript segment with timing, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// First text run of the segment
    pub text: String,

    /// Offset from the start of the video
    pub start: f64,

    /// Segment length
    pub duration: f64,
}

/// Successful transcript lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub video_id: String,

    /// Input URL, verbatim
    pub video_url: String,

    pub transcript: Vec<TranscriptSegment>,
}

/// Watch page -> token scrape -> transcript endpoint -> reshape
pub struct TranscriptPipeline {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl TranscriptPipeline {
    /// Create a pipeline talking to the configured upstream over reqwest
    pub fn new(upstream: &UpstreamConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(upstream)?;
        Ok(Self::with_transport(Arc::new(transport), &upstream.base_url))
    }

    /// Create a pipeline on top of any transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the transcript for a video. Nothing is cached or retried.
    ///
    /// Failures are returned, not logged; callers decide how to report them.
    pub async fn fetch_transcript(
        &self,
        video_id: &VideoId,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let html = self.fetch_watch_page(video_id).await?;
        let tokens = scrape_page_tokens(&html)?;
        let body = self.fetch_transcript_data(video_id, &tokens).await?;

        let segments = processor::process_transcript_body(&body)?;
        tracing::info!(video_id = %video_id, segments = segments.len(), "Found transcript segments");

        Ok(segments)
    }

    /// Download the watch page HTML
    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String, TranscriptError> {
        let url = video_id.watch_url(&self.base_url);
        tracing::debug!("Fetching video page: {}", url);

        let response = self.transport.get_page(&url).await?;
        if !response.is_success() {
            return Err(TranscriptError::WatchPageStatus(response.status));
        }

        tracing::debug!("Successfully fetched video page");
        Ok(response.body)
    }

    /// Call the transcript endpoint with the scraped tokens
    async fn fetch_transcript_data(
        &self,
        video_id: &VideoId,
        tokens: &PageTokens,
    ) -> Result<String, TranscriptError> {
        let url = self.transcript_endpoint(&tokens.api_key)?;
        let body = transcript_request_body(video_id, &tokens.client_version);

        tracing::debug!("Fetching transcript list");
        let response = self.transport.post_json(url.as_str(), &body).await?;
        if !response.is_success() {
            tracing::debug!(status = response.status, body = %response.body, "Transcript list response");
            return Err(TranscriptError::TranscriptApiStatus(response.status));
        }

        Ok(response.body)
    }

    fn transcript_endpoint(&self, api_key: &str) -> Result<Url, TranscriptError> {
        let endpoint = format!("{}{}", self.base_url, TRANSCRIPT_ENDPOINT_PATH);
        Url::parse_with_params(&endpoint, &[("key", api_key)])
            .map_err(|e| TranscriptError::InvalidEndpoint(format!("{}: {}", endpoint, e)))
    }
}

/// JSON body for the transcript endpoint
pub fn transcript_request_body(video_id: &VideoId, client_version: &str) -> Value {
    json!({
        "context": {
            "client": {
                "hl": CLIENT_LANGUAGE,
                "gl": CLIENT_REGION,
                "clientName": CLIENT_NAME,
                "clientVersion": client_version,
                "clientScreen": CLIENT_SCREEN,
                "mainAppWebInfo": {
                    "graftUrl": format!("/watch?v={}", video_id)
                }
            }
        },
        "videoId": video_id.as_str()
    })
}
