use anyhow::Result;
use url::Url;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "unknown".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format a cue timestamp as `HH:MM:SS`, with milliseconds after `fraction_sep` if given.
///
/// Non-finite or negative input renders as dashes so one bad segment doesn't abort output.
pub fn format_timestamp(seconds: f64, fraction_sep: Option<char>) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return match fraction_sep {
            Some(sep) => format!("--:--:--{}---", sep),
            None => "--:--:--".to_string(),
        };
    }

    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    match fraction_sep {
        Some(sep) => format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, sep, millis),
        None => format!("{:02}:{:02}:{:02}", hours, minutes, secs),
    }
}
