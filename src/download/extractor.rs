// Embedded album metadata extraction

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::api_types::TralbumData;
use crate::download::{AlbumMetadata, TrackEntry};
use crate::error::{DownloadError, Result};

const TRALBUM_ATTR: &str = "data-tralbum";

static TRALBUM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[data-tralbum]").expect("valid tralbum selector"));

/// Decode every `data-tralbum` blob carried by a `<script>` element
///
/// Each blob is decoded independently so one malformed blob does not hide
/// the others. A page without blobs yields an empty list.
pub fn extract_albums(html: &str) -> Vec<Result<AlbumMetadata>> {
    let document = Html::parse_document(html);

    document
        .select(&TRALBUM_SELECTOR)
        .filter_map(|element| element.value().attr(TRALBUM_ATTR))
        .map(parse_tralbum)
        .collect()
}

/// Decode a single blob into album metadata
pub fn parse_tralbum(json: &str) -> Result<AlbumMetadata> {
    let data: TralbumData = serde_json::from_str(json)?;

    let artist = non_empty(data.artist).ok_or_else(|| missing("artist"))?;
    let title = non_empty(data.current.title).ok_or_else(|| missing("album title"))?;
    let art_id = data
        .art_id
        .or(data.current.art_id)
        .ok_or_else(|| missing("art_id"))?;

    let tracks = data
        .trackinfo
        .into_iter()
        .map(|track| TrackEntry {
            title: track.title,
            source_url: track.file.and_then(|f| f.mp3_128).unwrap_or_default(),
            track_number: track.track_num,
        })
        .collect();

    Ok(AlbumMetadata {
        artist,
        title,
        art_id,
        release_date: data.album_release_date.or(data.current.release_date),
        tracks,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing(field: &str) -> DownloadError {
    DownloadError::MetadataParse(format!("missing {}", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AlbumMetadata {
        AlbumMetadata {
            artist: "Sigur Rós".to_string(),
            title: "Ágætis byrjun".to_string(),
            art_id: 3_000_111_222,
            release_date: Some("12 Jun 1999 00:00:00 GMT".to_string()),
            tracks: vec![
                TrackEntry {
                    title: "Svefn-g-englar".to_string(),
                    source_url: "https://t4.bcbits.com/stream/1".to_string(),
                    track_number: Some(1),
                },
                TrackEntry {
                    title: "Starálfur".to_string(),
                    source_url: String::new(),
                    track_number: Some(2),
                },
            ],
        }
    }

    /// Encode metadata in the shape pages embed it
    fn to_blob(album: &AlbumMetadata) -> String {
        let trackinfo: Vec<_> = album
            .tracks
            .iter()
            .map(|t| {
                let file = if t.source_url.is_empty() {
                    serde_json::Value::Null
                } else {
                    json!({ "mp3-128": t.source_url })
                };
                json!({ "title": t.title, "track_num": t.track_number, "file": file, "track_id": 9 })
            })
            .collect();

        json!({
            "current": { "title": album.title, "art_id": album.art_id, "id": 77 },
            "artist": album.artist,
            "art_id": album.art_id,
            "album_release_date": album.release_date,
            "trackinfo": trackinfo,
            "is_preorder": false
        })
        .to_string()
    }

    fn escape_attr(s: &str) -> String {
        s.replace('&', "&amp;").replace('"', "&quot;")
    }

    #[test]
    fn test_blob_round_trip() {
        let album = sample();
        assert_eq!(parse_tralbum(&to_blob(&album)).unwrap(), album);
    }

    #[test]
    fn test_extract_from_page() {
        let album = sample();
        let html = format!(
            r#"<html><head><script src="x.js" data-tralbum="{}"></script></head><body></body></html>"#,
            escape_attr(&to_blob(&album))
        );

        let albums = extract_albums(&html);
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].as_ref().unwrap(), &album);
    }

    #[test]
    fn test_only_script_elements_are_read() {
        let blob = escape_attr(&to_blob(&sample()));
        let html = format!(
            r#"<div data-tralbum="{{not json"></div><meta data-tralbum="{0}"><script data-tralbum="{0}"></script>"#,
            blob
        );

        let albums = extract_albums(&html);
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].as_ref().unwrap(), &sample());
    }

    #[test]
    fn test_no_blobs() {
        assert!(extract_albums("<html><body><p>nothing here</p></body></html>").is_empty());
    }

    #[test]
    fn test_malformed_blob_is_isolated() {
        let good = escape_attr(&to_blob(&sample()));
        let html = format!(
            r#"<script data-tralbum="{{not json"></script><script data-tralbum="{}"></script>"#,
            good
        );

        let albums = extract_albums(&html);
        assert_eq!(albums.len(), 2);
        assert!(matches!(albums[0], Err(DownloadError::MetadataParse(_))));
        assert!(albums[1].is_ok());
    }

    #[test]
    fn test_missing_artist_or_title_is_error() {
        let no_artist = json!({
            "current": { "title": "Album" }, "art_id": 1, "trackinfo": []
        });
        assert!(matches!(
            parse_tralbum(&no_artist.to_string()),
            Err(DownloadError::MetadataParse(msg)) if msg.contains("artist")
        ));

        let empty_title = json!({
            "current": { "title": "" }, "artist": "A", "art_id": 1, "trackinfo": []
        });
        assert!(parse_tralbum(&empty_title.to_string()).is_err());
    }

    #[test]
    fn test_art_id_falls_back_to_current() {
        let blob = json!({
            "current": { "title": "Album", "art_id": 55, "release_date": "01 Jan 2020" },
            "artist": "A",
            "trackinfo": [{ "title": "t", "file": { "mp3-128": "u" } }]
        });
        let album = parse_tralbum(&blob.to_string()).unwrap();
        assert_eq!(album.art_id, 55);
        assert_eq!(album.release_date.as_deref(), Some("01 Jan 2020"));
        assert_eq!(album.tracks[0].source_url, "u");
    }

    #[test]
    fn test_wrong_shape_is_error() {
        assert!(parse_tralbum(r#"{"current": {}, "artist": "A", "trackinfo": "nope"}"#).is_err());
        assert!(parse_tralbum("[]").is_err());
    }
}
