// Runtime settings for a download run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fixed artwork host; images are addressed as `<base>/a<art_id>_16.jpg`
pub const DEFAULT_ARTWORK_BASE_URL: &str = "https://f4.bcbits.com/img";

/// Spinner refresh interval
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Directory album folders are created in
    pub output_dir: PathBuf,
    pub artwork_base_url: String,
    /// Cap on simultaneous track tasks; `None` spawns every track at once
    pub max_concurrent_tracks: Option<usize>,
    #[serde(with = "duration_millis")]
    pub progress_interval: Duration,
    pub show_progress: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            artwork_base_url: DEFAULT_ARTWORK_BASE_URL.to_string(),
            max_concurrent_tracks: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            show_progress: true,
        }
    }
}

impl DownloadSettings {
    /// Artwork URL for an album art identifier
    pub fn artwork_url(&self, art_id: u64) -> String {
        format!("{}/a{}_16.jpg", self.artwork_base_url.trim_end_matches('/'), art_id)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DownloadSettings::default();
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert_eq!(settings.max_concurrent_tracks, None);
        assert_eq!(settings.progress_interval, Duration::from_millis(200));
        assert!(settings.show_progress);
    }

    #[test]
    fn test_artwork_url_template() {
        let settings = DownloadSettings::default();
        assert_eq!(settings.artwork_url(1234567), "https://f4.bcbits.com/img/a1234567_16.jpg");

        let local = DownloadSettings {
            artwork_base_url: "http://127.0.0.1:9000/img/".to_string(),
            ..Default::default()
        };
        assert_eq!(local.artwork_url(7), "http://127.0.0.1:9000/img/a7_16.jpg");
    }

    #[test]
    fn test_serde_interval_as_millis() {
        let json = serde_json::to_value(DownloadSettings::default()).unwrap();
        assert_eq!(json["progress_interval"], 200);

        let back: DownloadSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }
}
