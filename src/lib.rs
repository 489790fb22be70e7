//! YouTube Transcript Service - fetch the primary transcript of a public YouTube video
//!
//! The library scrapes the short-lived page tokens from a video's watch page, calls the
//! platform's internal transcript endpoint with them and reshapes the answer into a flat
//! list of timed segments. It is exposed both as an HTTP service and as a CLI.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod server;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{extract_video_id, VideoId};
pub use transcribe::{TranscriptPipeline, TranscriptResponse, TranscriptSegment};

/// Result type used throughout the application glue
pub type Result<T> = anyhow::Result<T>;

/// Error types raised by the transcript pipeline
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TranscriptError {
    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Failed to fetch video page: {0}")]
    WatchPageStatus(u16),

    #[error("Failed to fetch transcript list: {0}")]
    TranscriptApiStatus(u16),

    #[error("Could not find API key")]
    MissingApiKey,

    #[error("Could not find client version")]
    MissingClientVersion,

    #[error("No transcript data found (missing {0})")]
    NoTranscriptData(&'static str),

    #[error("No transcript segments found (missing {0})")]
    NoTranscriptSegments(&'static str),

    #[error("Invalid transcript response: {0}")]
    InvalidResponse(String),

    #[error("Request to upstream failed: {0}")]
    Transport(String),

    #[error("Invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for TranscriptError {
    fn from(err: reqwest::Error) -> Self {
        // the transcript URL carries the scraped key; keep it out of responses
        tracing::debug!("Upstream request error: {}", err);
        TranscriptError::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for TranscriptError {
    fn from(err: serde_json::Error) -> Self {
        TranscriptError::InvalidResponse(err.to_string())
    }
}
