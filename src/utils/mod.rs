// Utility functions module

pub mod filesystem;
pub mod settings;

// Re-export commonly used functions for convenience
pub use filesystem::{album_dir, artwork_path, create_album_dir, numbered_track_path, sanitize, track_path};
pub use settings::DownloadSettings;
