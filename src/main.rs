use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use youtube_transcript_service::cli::{Cli, Commands, OutputFormat};
use youtube_transcript_service::config::Config;
use youtube_transcript_service::transcribe::{TranscriptPipeline, TranscriptResponse};
use youtube_transcript_service::utils::format_duration;
use youtube_transcript_service::{extract_video_id, output, server, TranscriptError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Serve { address, port } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(address) = address {
                config.server.address = address;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            server::serve(&config).await?;
        }
        Commands::Fetch {
            url,
            output,
            format,
            timestamps,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            fetch(&config, url, output, format, timestamps, cli.quiet).await?;
        }
        Commands::Config { show } => {
            let path = Config::default_path(cli.config.as_deref())?;
            // writing a fresh file starts from defaults
            let config = if !show && !path.exists() {
                Config::default()
            } else {
                Config::load(cli.config.as_deref())?
            };

            if show {
                config.display();
            } else {
                config.save(&path)?;
                println!("Configuration written to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "youtube_transcript_service=debug,tower_http=debug"
    } else {
        "youtube_transcript_service=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // stdout is reserved for `fetch` output
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn fetch(
    config: &Config,
    url: String,
    output: Option<PathBuf>,
    format: OutputFormat,
    timestamps: bool,
    quiet: bool,
) -> Result<()> {
    let video_id = extract_video_id(&url).ok_or(TranscriptError::InvalidUrl)?;
    let pipeline = TranscriptPipeline::new(&config.upstream)?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress.set_message(format!("Fetching transcript for {}...", video_id));
    progress.enable_steady_tick(Duration::from_millis(100));

    let transcript = match pipeline.fetch_transcript(&video_id).await {
        Ok(transcript) => transcript,
        Err(err) => {
            progress.finish_and_clear();
            return Err(err.into());
        }
    };

    let covered = transcript
        .last()
        .map(|segment| segment.start + segment.duration)
        .unwrap_or(0.0);
    progress.finish_with_message(format!(
        "Fetched {} segments ({})",
        transcript.len(),
        format_duration(covered)
    ));

    let result = TranscriptResponse {
        video_id: video_id.to_string(),
        video_url: url,
        transcript,
    };

    match output {
        Some(path) => {
            output::save_to_file(&result, &path, &format, timestamps)?;
            println!("Transcript saved to: {}", path.display());
        }
        None => {
            output::print_to_console(&result, &format, timestamps)?;
        }
    }

    Ok(())
}
