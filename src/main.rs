//! Bandcamp Downloads - command-line entry point
//!
//! Usage: `bandcamp-downloads <URL>` downloads the album on the page into a
//! folder under the current directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use bandcamp_downloads_lib::{run_page, DownloadSettings, PageSummary, TrackOutcome};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "bandcamp-downloads")]
#[command(about = "Download a Bandcamp album and tag every track with its cover art")]
#[command(version)]
struct Args {
    /// Album or track page URL
    url: String,

    /// Directory the album folder is created in
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Maximum number of tracks downloaded at once (default: all)
    #[arg(short = 'j', long)]
    max_concurrent: Option<usize>,

    /// Do not draw the progress spinner
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so the spinner on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bandcamp_downloads=info,bandcamp_downloads_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Usage errors exit with 1, help and version with 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    match run(args).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<PageSummary> {
    let url = Url::parse(&args.url).with_context(|| format!("Invalid page URL: {}", args.url))?;

    let settings = DownloadSettings {
        output_dir: args.output_dir,
        max_concurrent_tracks: args.max_concurrent,
        show_progress: !args.quiet,
        ..Default::default()
    };

    let summary = run_page(url.as_str(), settings)
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    for report in &summary.reports {
        info!(
            "{} - {}: {} downloaded, {} skipped, {} failed ({})",
            report.artist,
            report.album,
            report.completed(),
            report.skipped(),
            report.failed(),
            report.output_dir().display()
        );
        for track in &report.tracks {
            if let TrackOutcome::Failed { stage, error } = &track.outcome {
                warn!(
                    "  {} failed during {} ({} error): {}",
                    track.title,
                    stage,
                    error.kind(),
                    error
                );
            }
        }
    }
    for failure in &summary.failures {
        error!("Album not downloaded ({} error): {}", failure.kind(), failure);
    }

    Ok(summary)
}
