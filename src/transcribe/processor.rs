use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::TranscriptSegment;
use crate::TranscriptError;

/// Transcript endpoint reply, only the branch leading to the segment list.
///
/// Every level is optional so each absent node maps to its own failure. A node
/// holding the wrong JSON type counts as absent.
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptApiResponse {
    #[serde(default, deserialize_with = "array_or_none")]
    actions: Option<Vec<Action>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Action {
    #[serde(default, deserialize_with = "object_or_none")]
    update_engagement_panel_action: Option<UpdateEngagementPanelAction>,
}

#[derive(Debug, Deserialize)]
struct UpdateEngagementPanelAction {
    #[serde(default, deserialize_with = "object_or_none")]
    content: Option<PanelContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PanelContent {
    #[serde(default, deserialize_with = "object_or_none")]
    transcript_renderer: Option<TranscriptRenderer>,
}

#[derive(Debug, Deserialize)]
struct TranscriptRenderer {
    #[serde(default, deserialize_with = "object_or_none")]
    content: Option<RendererContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RendererContent {
    #[serde(default, deserialize_with = "object_or_none")]
    transcript_search_panel_renderer: Option<SearchPanelRenderer>,
}

#[derive(Debug, Deserialize)]
struct SearchPanelRenderer {
    #[serde(default, deserialize_with = "object_or_none")]
    body: Option<SearchPanelBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPanelBody {
    #[serde(default, deserialize_with = "object_or_none")]
    transcript_segment_list_renderer: Option<SegmentListRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentListRenderer {
    #[serde(default, deserialize_with = "array_or_none")]
    initial_segments: Option<Vec<SegmentEntry>>,
}

/// One entry of `initialSegments`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SegmentEntry {
    transcript_segment_renderer: Option<SegmentRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentRenderer {
    start_ms: Option<Value>,
    end_ms: Option<Value>,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: Option<String>,
}

fn object_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => T::deserialize(value).map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

fn array_or_none<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Array(_)) => {
            Vec::<T>::deserialize(value).map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}

impl TranscriptApiResponse {
    /// Walk down to `initialSegments`, reporting the first node that is absent
    pub(crate) fn into_segment_entries(self) -> Result<Vec<SegmentEntry>, TranscriptError> {
        use TranscriptError::{NoTranscriptData, NoTranscriptSegments};

        let renderer = self
            .actions
            .ok_or(NoTranscriptData("actions"))?
            .into_iter()
            .next()
            .ok_or(NoTranscriptData("actions[0]"))?
            .update_engagement_panel_action
            .ok_or(NoTranscriptData("updateEngagementPanelAction"))?
            .content
            .ok_or(NoTranscriptData("content"))?
            .transcript_renderer
            .ok_or(NoTranscriptData("transcriptRenderer"))?;

        let entries = renderer
            .content
            .ok_or(NoTranscriptSegments("content"))?
            .transcript_search_panel_renderer
            .ok_or(NoTranscriptSegments("transcriptSearchPanelRenderer"))?
            .body
            .ok_or(NoTranscriptSegments("body"))?
            .transcript_segment_list_renderer
            .ok_or(NoTranscriptSegments("transcriptSegmentListRenderer"))?
            .initial_segments
            .ok_or(NoTranscriptSegments("initialSegments"))?;

        if entries.is_empty() {
            return Err(NoTranscriptSegments("initialSegments"));
        }

        Ok(entries)
    }
}

/// Parse a raw endpoint body and reshape it into ordered segments
pub fn process_transcript_body(body: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    let response: TranscriptApiResponse = serde_json::from_str(body)?;
    let entries = response.into_segment_entries()?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| reshape_segment(index, entry))
        .collect()
}

/// Convert one entry: first text run, millisecond offsets to seconds
fn reshape_segment(index: usize, entry: SegmentEntry) -> Result<TranscriptSegment, TranscriptError> {
    let missing = |node: &str| {
        TranscriptError::InvalidResponse(format!("segment {} missing {}", index, node))
    };

    let renderer = entry
        .transcript_segment_renderer
        .ok_or_else(|| missing("transcriptSegmentRenderer"))?;

    let text = renderer
        .snippet
        .and_then(|snippet| snippet.runs)
        .and_then(|runs| runs.into_iter().next())
        .and_then(|run| run.text)
        .ok_or_else(|| missing("snippet.runs[0].text"))?;

    let start_ms = parse_millis(renderer.start_ms.as_ref());
    let end_ms = parse_millis(renderer.end_ms.as_ref());

    Ok(TranscriptSegment {
        text,
        start: start_ms / 1000.0,
        duration: (end_ms - start_ms) / 1000.0,
    })
}

/// Lenient millisecond parse: absent or non-numeric becomes NaN
pub(crate) fn parse_millis(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

/// Parse the longest leading decimal number of `s`, ignoring leading whitespace
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = skip_sign(bytes, 0);
    let mut seen_digit = false;
    let mut seen_dot = false;

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return f64::NAN;
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let digits_from = skip_sign(bytes, end + 1);
        let digits_to = digits_from
            + bytes[digits_from..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
        if digits_to > digits_from {
            end = digits_to;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn skip_sign(bytes: &[u8], at: usize) -> usize {
    match bytes.get(at) {
        Some(b'+') | Some(b'-') => at + 1,
        _ => at,
    }
}
