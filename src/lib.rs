// Bandcamp Downloads - album downloader
// Fetches an album page, downloads every track and embeds tags plus cover art
// One concurrent task per track; setup failures abort the album, track
// failures are isolated and reported

use tracing::{error, info};

// ============================================================================
// Module Imports
// ============================================================================

pub mod api_types;
pub mod download;
pub mod error;
pub mod utils;

pub use api_types::BandcampClient;
pub use download::{
    extract_albums, AlbumMetadata, AlbumReport, JobProcessor, TrackOutcome, TrackStage,
};
pub use error::{DownloadError, ErrorKind, Result};
pub use utils::DownloadSettings;

// ============================================================================
// Page Processing
// ============================================================================

/// Result of processing every album embedded in one page
#[derive(Debug, Default)]
pub struct PageSummary {
    pub reports: Vec<AlbumReport>,
    /// Albums that could not be parsed or set up
    pub failures: Vec<DownloadError>,
}

impl PageSummary {
    /// True when every album ran and no track failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.reports.iter().all(AlbumReport::is_success)
    }
}

/// Fetch a page and download every album it embeds
/// Only the page fetch itself is fatal here
pub async fn run_page(url: &str, settings: DownloadSettings) -> Result<PageSummary> {
    info!("Getting... {}", url);

    let client = BandcampClient::new()?;
    let html = client.fetch_page(url).await?;
    let processor = JobProcessor::new(client, settings);

    Ok(process_page(&processor, &html).await)
}

/// Run one album job per embedded metadata blob, one after another
/// A malformed blob or failed album never stops the remaining ones
pub async fn process_page(processor: &JobProcessor, html: &str) -> PageSummary {
    let albums = extract_albums(html);
    if albums.is_empty() {
        info!("No album metadata found on page");
    }

    let mut summary = PageSummary::default();
    for parsed in albums {
        let metadata = match parsed {
            Ok(metadata) => metadata,
            Err(e) => {
                error!(error = %e, "Skipping malformed album metadata");
                summary.failures.push(e);
                continue;
            }
        };

        info!(artist = %metadata.artist, album = %metadata.title, tracks = metadata.tracks.len(), "Downloading album");
        match processor.process_album(&metadata).await {
            Ok(report) => summary.reports.push(report),
            Err(e) => summary.failures.push(e),
        }
    }

    summary
}
