// Album job processor - orchestrates the fetch-and-tag flow for one album

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api_types::BandcampClient;
use crate::download::progress::{ProgressReporter, ProgressTracker};
use crate::download::tagger::{self, TrackTags};
use crate::download::{
    AlbumMetadata, AlbumReport, AlbumState, DownloadJob, TrackJob, TrackOutcome, TrackReport,
    TrackStage,
};
use crate::error::{DownloadError, Result};
use crate::utils::{self, DownloadSettings};

// ============================================================================
// Job Processor
// ============================================================================

pub struct JobProcessor {
    client: BandcampClient,
    settings: DownloadSettings,
}

impl JobProcessor {
    pub fn new(client: BandcampClient, settings: DownloadSettings) -> Self {
        Self { client, settings }
    }

    /// Download and tag every track of one album
    ///
    /// Directory creation and the artwork fetch are fatal and return `Err`.
    /// Track failures never abort siblings; they are recorded in the report.
    pub async fn process_album(&self, metadata: &AlbumMetadata) -> Result<AlbumReport> {
        let job = DownloadJob::from_metadata(metadata, &self.settings);
        let mut state = AlbumState::Created;
        debug!(album = %job.label(), ?state, "Album job created");

        match self.run_job(&job, &mut state).await {
            Ok(report) => Ok(report),
            Err(e) => {
                advance(&job, &mut state, AlbumState::Failed);
                error!(album = %job.label(), error = %e, "Album aborted");
                Err(e)
            }
        }
    }

    async fn run_job(&self, job: &DownloadJob, state: &mut AlbumState) -> Result<AlbumReport> {
        utils::create_album_dir(&job.output_dir)?;
        advance(job, state, AlbumState::DirectoryReady);

        self.client.fetch(&job.artwork_url, &job.artwork_path).await?;
        advance(job, state, AlbumState::ArtworkFetched);

        let tracker = ProgressTracker::new();
        let reporter = ProgressReporter::start(
            tracker.clone(),
            self.settings.progress_interval,
            self.settings.show_progress,
        );

        let limiter = self
            .settings
            .max_concurrent_tracks
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        let handles: Vec<(String, JoinHandle<TrackOutcome>)> = job
            .tracks
            .iter()
            .cloned()
            .map(|track| {
                let title = track.title.clone();
                let client = self.client.clone();
                let tracker = tracker.clone();
                let limiter = limiter.clone();
                let handle = tokio::spawn(async move {
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    process_track(&client, &tracker, track).await
                });
                (title, handle)
            })
            .collect();
        advance(job, state, AlbumState::TracksInFlight);

        let mut tracks = Vec::with_capacity(handles.len() + job.skipped.len());
        for (title, handle) in handles {
            let outcome = handle.await.unwrap_or_else(|e| {
                error!(artist = %job.artist, title = %title, error = %e, "Track task did not finish");
                TrackOutcome::Failed {
                    stage: TrackStage::Download,
                    error: DownloadError::Task(e.to_string()),
                }
            });
            tracks.push(TrackReport { title, outcome });
        }

        reporter.stop().await;

        for title in &job.skipped {
            warn!(artist = %job.artist, title = %title, "No audio stream, skipping track");
            tracks.push(TrackReport {
                title: title.clone(),
                outcome: TrackOutcome::Skipped,
            });
        }

        let cleanup_error = tokio::fs::remove_file(&job.artwork_path)
            .await
            .map_err(|source| DownloadError::Cleanup {
                path: job.artwork_path.clone(),
                source,
            })
            .err();
        if let Some(e) = &cleanup_error {
            warn!(album = %job.label(), error = %e, "Artwork cleanup failed");
        }
        advance(job, state, AlbumState::Cleaned);

        let report = AlbumReport {
            artist: job.artist.clone(),
            album: job.album.clone(),
            output_dir: job.output_dir.clone(),
            tracks,
            cleanup_error,
        };
        advance(job, state, AlbumState::Done);
        info!(
            album = %job.label(),
            completed = report.completed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "...Done"
        );

        Ok(report)
    }
}

/// One track's unit of work: download, then tag
async fn process_track(
    client: &BandcampClient,
    tracker: &ProgressTracker,
    track: TrackJob,
) -> TrackOutcome {
    tracker.push(track.label());
    debug!(artist = %track.artist, title = %track.title, url = %track.url, "Downloading track");

    if let Err(e) = client.fetch(&track.url, &track.path).await {
        return failed(&track, TrackStage::Download, e);
    }

    let path = track.path.clone();
    let tagged = {
        let track = track.clone();
        tokio::task::spawn_blocking(move || {
            let tags = TrackTags {
                artist: &track.artist,
                title: &track.title,
                album: &track.album,
                track_number: track.track_number,
            };
            tagger::embed_tags(&track.path, &track.artwork_path, &tags)
        })
        .await
        .unwrap_or_else(|e| Err(DownloadError::Task(e.to_string())))
    };

    match tagged {
        Ok(()) => {
            debug!(artist = %track.artist, title = %track.title, "Track complete");
            TrackOutcome::Completed { path }
        }
        Err(e) => failed(&track, TrackStage::Tag, e),
    }
}

fn failed(track: &TrackJob, stage: TrackStage, error: DownloadError) -> TrackOutcome {
    error!(
        artist = %track.artist,
        title = %track.title,
        stage = %stage,
        error = %error,
        "Track failed"
    );
    TrackOutcome::Failed { stage, error }
}

fn advance(job: &DownloadJob, state: &mut AlbumState, next: AlbumState) {
    let from = *state;
    debug!(album = %job.label(), ?from, to = ?next, "Album state");
    *state = next;
}
