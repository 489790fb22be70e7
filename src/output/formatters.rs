use anyhow::Result;

use crate::transcribe::TranscriptResponse;
use crate::utils::format_timestamp;

/// Pretty JSON, same shape as the HTTP success body
pub fn format_as_json(result: &TranscriptResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// One line per segment, optionally prefixed with `[HH:MM:SS]`
pub fn format_as_text(result: &TranscriptResponse, include_timestamps: bool) -> String {
    result
        .transcript
        .iter()
        .map(|segment| {
            if include_timestamps {
                format!("[{}] {}", format_timestamp(segment.start, None), segment.text)
            } else {
                segment.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// SubRip cues
pub fn format_as_srt(result: &TranscriptResponse) -> String {
    let mut out = String::new();

    for (index, segment) in result.transcript.iter().enumerate() {
        let end = segment.start + segment.duration;
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_timestamp(segment.start, Some(',')),
            format_timestamp(end, Some(',')),
            segment.text
        ));
    }

    out
}

/// WebVTT cues
pub fn format_as_vtt(result: &TranscriptResponse) -> String {
    let mut out = String::from("WEBVTT\n\n");

    for segment in &result.transcript {
        let end = segment.start + segment.duration;
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_timestamp(segment.start, Some('.')),
            format_timestamp(end, Some('.')),
            segment.text
        ));
    }

    out
}
