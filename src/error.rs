// Error types for the fetch-and-tag pipeline

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Broad failure category, used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Filesystem,
    Tag,
    /// A task of ours panicked or was cancelled; not caused by the input
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::Filesystem => "filesystem",
            ErrorKind::Tag => "tag",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure while requesting or streaming a resource
    #[error("Request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("Request to {url} returned status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Embedded album metadata is not valid JSON of the expected shape
    #[error("Failed to parse album metadata: {0}")]
    MetadataParse(String),

    #[error("Failed to create album directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open tag container {}: {source}", path.display())]
    TagOpen {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },

    #[error("Failed to read artwork {}: {source}", path.display())]
    ArtworkRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save tags to {}: {source}", path.display())]
    TagSave {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },

    /// A spawned track task panicked or was aborted
    #[error("Track task did not finish: {0}")]
    Task(String),
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::Client(_)
            | DownloadError::Fetch { .. }
            | DownloadError::HttpStatus { .. } => ErrorKind::Network,
            DownloadError::MetadataParse(_) => ErrorKind::Parse,
            DownloadError::Directory { .. }
            | DownloadError::Write { .. }
            | DownloadError::Cleanup { .. } => ErrorKind::Filesystem,
            DownloadError::TagOpen { .. }
            | DownloadError::ArtworkRead { .. }
            | DownloadError::TagSave { .. } => ErrorKind::Tag,
            DownloadError::Task(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(e: serde_json::Error) -> Self {
        DownloadError::MetadataParse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_buckets() {
        let parse: DownloadError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(parse.kind(), ErrorKind::Parse);

        let dir = DownloadError::Directory {
            path: PathBuf::from("x"),
            source: std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        };
        assert_eq!(dir.kind(), ErrorKind::Filesystem);
        assert!(dir.to_string().contains("Failed to create album directory x"));

        let artwork = DownloadError::ArtworkRead {
            path: PathBuf::from("a.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(artwork.kind(), ErrorKind::Tag);

        let task = DownloadError::Task("task 3 panicked".to_string());
        assert_eq!(task.kind(), ErrorKind::Internal);
        assert_eq!(task.kind().to_string(), "internal");
        assert_eq!(dir.kind().to_string(), "filesystem");
    }
}
