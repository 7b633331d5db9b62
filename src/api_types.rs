/**
 * Page Types - Shapes of the album data Bandcamp embeds in its pages
 *
 * Album and track pages carry a `data-tralbum` attribute holding a JSON
 * document. Only the fields the downloader needs are modelled; everything
 * else in the blob is ignored.
 */

use std::path::Path;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{DownloadError, Result};

// ============================================================================
// Embedded Metadata Types
// ============================================================================

/// Top-level `data-tralbum` document
#[derive(Debug, Clone, Deserialize)]
pub struct TralbumData {
    pub current: TralbumCurrent,

    pub artist: Option<String>,

    pub art_id: Option<u64>,

    pub album_release_date: Option<String>,

    pub trackinfo: Vec<TralbumTrack>,
}

/// The release the page is about
#[derive(Debug, Clone, Deserialize)]
pub struct TralbumCurrent {
    pub title: Option<String>,

    pub art_id: Option<u64>,

    pub release_date: Option<String>,
}

/// One entry of `trackinfo`
#[derive(Debug, Clone, Deserialize)]
pub struct TralbumTrack {
    pub title: String,

    pub track_num: Option<u32>,

    /// `null` when the track has no public stream
    pub file: Option<TralbumFile>,
}

/// Stream URLs keyed by format
#[derive(Debug, Clone, Deserialize)]
pub struct TralbumFile {
    #[serde(rename = "mp3-128")]
    pub mp3_128: Option<String>,
}

// ============================================================================
// HTTP Client
// ============================================================================

const USER_AGENT: &str = concat!("bandcamp-downloads/", env!("CARGO_PKG_VERSION"));

/// HTTP client for pages and assets
///
/// No request timeout is configured: a transfer runs until it completes or
/// the connection fails.
#[derive(Debug, Clone)]
pub struct BandcampClient {
    client: reqwest::Client,
}

impl BandcampClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(DownloadError::Client)?;
        Ok(Self { client })
    }

    /// Get a page body as text
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| DownloadError::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// Download `url` into a new file at `dest`, replacing any existing file
    /// The body is streamed to disk chunk by chunk. If the transfer breaks
    /// off, the partial file is removed (best effort).
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.get(url).await?;

        let file = tokio::fs::File::create(dest)
            .await
            .map_err(|source| DownloadError::Write {
                path: dest.to_path_buf(),
                source,
            })?;

        if let Err(e) = stream_body(response, file, url, dest).await {
            if let Err(cleanup) = tokio::fs::remove_file(dest).await {
                warn!(path = %dest.display(), error = %cleanup, "Could not remove partial download");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response)
    }
}

async fn stream_body(
    response: reqwest::Response,
    mut file: tokio::fs::File,
    url: &str,
    dest: &Path,
) -> Result<()> {
    let write_err = |source| DownloadError::Write {
        path: dest.to_path_buf(),
        source,
    };
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DownloadError::Fetch {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_err)?;
    }

    file.flush().await.map_err(write_err)
}
