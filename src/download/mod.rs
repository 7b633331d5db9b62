// Album download module

pub mod extractor;
pub mod models;
pub mod processor;
pub mod progress;
pub mod tagger;

// Re-export common types
pub use models::{
    AlbumMetadata,
    AlbumReport,
    AlbumState,
    DownloadJob,
    TrackEntry,
    TrackJob,
    TrackOutcome,
    TrackReport,
    TrackStage,
};

pub use extractor::{extract_albums, parse_tralbum};
pub use processor::JobProcessor;
pub use progress::{ProgressReporter, ProgressTracker};
