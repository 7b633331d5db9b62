// Filesystem utilities for path handling

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};

/// Sanitize a path segment by keeping only ASCII letters and digits
/// Spaces, punctuation, separators and any non-ASCII character are dropped
pub fn sanitize(text: &str) -> String {
    text.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Album directory: <base>/<artist><album>
pub fn album_dir(base_dir: &Path, artist: &str, album: &str) -> PathBuf {
    base_dir.join(format!("{}{}", sanitize(artist), sanitize(album)))
}

/// Track file inside the album directory: "<artist>-<title>.mp3"
pub fn track_path(album_dir: &Path, artist: &str, title: &str) -> PathBuf {
    album_dir.join(format!("{}-{}.mp3", sanitize(artist), sanitize(title)))
}

/// Track file for a title that collides with an earlier one: "<artist>-<title>-<n>.mp3"
pub fn numbered_track_path(album_dir: &Path, artist: &str, title: &str, n: u32) -> PathBuf {
    album_dir.join(format!("{}-{}-{}.mp3", sanitize(artist), sanitize(title), n))
}

/// Transient artwork file inside the album directory: "<album>.jpg"
pub fn artwork_path(album_dir: &Path, album: &str) -> PathBuf {
    album_dir.join(format!("{}.jpg", sanitize(album)))
}

/// Create the album directory
/// Fails when it already exists; there is no merge policy
pub fn create_album_dir(path: &Path) -> Result<()> {
    fs::create_dir(path).map_err(|source| DownloadError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_non_ascii_and_punctuation() {
        assert_eq!(sanitize("Sigur Rós: Ágætis Byrjun!"), "SigurRsgtisByrjun");
        assert_eq!(sanitize("AC/DC - Back in Black (1980)"), "ACDCBackinBlack1980");
        assert_eq!(sanitize("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_idempotent_and_charset() {
        let samples = [
            "Sigur Rós: Ágætis Byrjun!",
            "日本語 title 42",
            "tab\tnew\nline",
            "already123Clean",
            "ñ-ü-ß_ø",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_derived_paths() {
        let base = Path::new("out");
        let dir = album_dir(base, "Artist X", "Album Y");
        assert_eq!(dir, Path::new("out/ArtistXAlbumY"));
        assert_eq!(
            track_path(&dir, "Artist X", "Song #1"),
            Path::new("out/ArtistXAlbumY/ArtistX-Song1.mp3")
        );
        assert_eq!(
            numbered_track_path(&dir, "Artist X", "Song?", 2),
            Path::new("out/ArtistXAlbumY/ArtistX-Song-2.mp3")
        );
        assert_eq!(artwork_path(&dir, "Album Y"), Path::new("out/ArtistXAlbumY/AlbumY.jpg"));
    }

    #[test]
    fn test_create_album_dir_refuses_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("ArtistAlbum");

        create_album_dir(&dir).unwrap();
        assert!(dir.is_dir());

        let err = create_album_dir(&dir).unwrap_err();
        assert!(matches!(err, DownloadError::Directory { .. }));
    }
}
