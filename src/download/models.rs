// Album and track job models

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DownloadError;
use crate::utils::{self, DownloadSettings};

// ============================================================================
// Extracted Metadata
// ============================================================================

/// One album as described by an embedded metadata blob
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumMetadata {
    pub artist: String,
    pub title: String,
    pub art_id: u64,
    /// Informational only
    pub release_date: Option<String>,
    pub tracks: Vec<TrackEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry {
    pub title: String,
    /// Empty when the track has no public stream
    pub source_url: String,
    pub track_number: Option<u32>,
}

impl TrackEntry {
    pub fn is_downloadable(&self) -> bool {
        !self.source_url.trim().is_empty()
    }
}

// ============================================================================
// Derived Jobs
// ============================================================================

/// Everything needed to download one album, derived from its metadata
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub artist: String,
    pub album: String,
    pub output_dir: PathBuf,
    pub artwork_url: String,
    pub artwork_path: PathBuf,
    pub tracks: Vec<TrackJob>,
    /// Titles of tracks without a source URL, in album order
    pub skipped: Vec<String>,
}

impl DownloadJob {
    pub fn from_metadata(metadata: &AlbumMetadata, settings: &DownloadSettings) -> Self {
        let output_dir = utils::album_dir(&settings.output_dir, &metadata.artist, &metadata.title);
        let artwork_path = utils::artwork_path(&output_dir, &metadata.title);

        let mut tracks = Vec::new();
        let mut skipped = Vec::new();
        let mut taken = HashSet::new();

        for (index, entry) in metadata.tracks.iter().enumerate() {
            if !entry.is_downloadable() {
                skipped.push(entry.title.clone());
                continue;
            }

            // Titles differing only in stripped characters share a sanitized
            // name; later ones get a number so no two tasks write one file
            let mut path = utils::track_path(&output_dir, &metadata.artist, &entry.title);
            let mut n = entry.track_number.unwrap_or(index as u32 + 1);
            while taken.contains(&path) {
                path = utils::numbered_track_path(&output_dir, &metadata.artist, &entry.title, n);
                n += 1;
            }
            taken.insert(path.clone());

            tracks.push(TrackJob {
                path,
                url: entry.source_url.clone(),
                artist: metadata.artist.clone(),
                title: entry.title.clone(),
                album: metadata.title.clone(),
                artwork_path: artwork_path.clone(),
                track_number: entry.track_number,
            });
        }

        DownloadJob {
            artist: metadata.artist.clone(),
            album: metadata.title.clone(),
            output_dir,
            artwork_url: settings.artwork_url(metadata.art_id),
            artwork_path,
            tracks,
            skipped,
        }
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.album)
    }
}

/// One track to fetch and tag; owned by exactly one task
#[derive(Debug, Clone)]
pub struct TrackJob {
    pub path: PathBuf,
    pub url: String,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub artwork_path: PathBuf,
    pub track_number: Option<u32>,
}

impl TrackJob {
    /// Label shown by the progress reporter
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

// ============================================================================
// Album State and Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumState {
    Created,
    DirectoryReady,
    ArtworkFetched,
    TracksInFlight,
    Cleaned,
    Done,
    Failed,
}

/// Step of a track's unit of work that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStage {
    Download,
    Tag,
}

impl fmt::Display for TrackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackStage::Download => write!(f, "download"),
            TrackStage::Tag => write!(f, "tag"),
        }
    }
}

#[derive(Debug)]
pub enum TrackOutcome {
    Completed { path: PathBuf },
    /// No source URL; nothing was attempted
    Skipped,
    Failed { stage: TrackStage, error: DownloadError },
}

#[derive(Debug)]
pub struct TrackReport {
    pub title: String,
    pub outcome: TrackOutcome,
}

/// Terminal result of one album run
#[derive(Debug)]
pub struct AlbumReport {
    pub artist: String,
    pub album: String,
    pub output_dir: PathBuf,
    pub tracks: Vec<TrackReport>,
    /// Set when the transient artwork file could not be removed
    pub cleanup_error: Option<DownloadError>,
}

impl AlbumReport {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, TrackOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TrackOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TrackOutcome::Failed { .. }))
    }

    /// True when no track failed; skips and cleanup problems do not count
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn count(&self, pred: impl Fn(&TrackOutcome) -> bool) -> usize {
        self.tracks.iter().filter(|t| pred(&t.outcome)).count()
    }
}
