use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub mod youtube;

pub use youtube::{scrape_page_tokens, PageTokens};

/// Matches `watch?v=`, `/embed/`, `/v/`, `/e/`, nested path and `youtu.be/` shapes
const VIDEO_ID_PATTERN: &str =
    r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#;

/// 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video on the given base
    pub fn watch_url(&self, base_url: &str) -> String {
        format!("{}/watch?v={}", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VIDEO_ID_PATTERN).expect("video id pattern is valid"))
}

/// Extract the video identifier from any supported YouTube URL shape.
///
/// Returns `None` when the input carries no recognizable identifier; callers must not
/// touch the network in that case.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    video_id_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}
