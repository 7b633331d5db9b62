//! Write artist/title/album and the front cover into a downloaded MP3.

use std::fs;
use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};

use crate::error::{DownloadError, Result};

pub const COVER_MIME: &str = "image/jpeg";
pub const COVER_DESCRIPTION: &str = "Front cover";

/// Text fields written to every track
#[derive(Debug, Clone)]
pub struct TrackTags<'a> {
    pub artist: &'a str,
    pub title: &'a str,
    pub album: &'a str,
    pub track_number: Option<u32>,
}

/// Embed tags and cover art into `audio_path`, saving in place.
///
/// A file that has no ID3 tag yet starts from an empty one. Existing text
/// values are overwritten and any previous front cover is replaced.
/// Blocking; call from `spawn_blocking` inside async code.
pub fn embed_tags(audio_path: &Path, artwork_path: &Path, tags: &TrackTags<'_>) -> Result<()> {
    let mut tag = open_tag(audio_path)?;

    let artwork = fs::read(artwork_path).map_err(|source| DownloadError::ArtworkRead {
        path: artwork_path.to_path_buf(),
        source,
    })?;

    tag.set_artist(tags.artist);
    tag.set_title(tags.title);
    tag.set_album(tags.album);
    if let Some(n) = tags.track_number {
        tag.set_track(n);
    }

    tag.remove_picture_by_type(PictureType::CoverFront);
    tag.add_frame(Picture {
        mime_type: COVER_MIME.to_string(),
        picture_type: PictureType::CoverFront,
        description: COVER_DESCRIPTION.to_string(),
        data: artwork,
    });

    tag.write_to_path(audio_path, Version::Id3v24)
        .map_err(|source| DownloadError::TagSave {
            path: audio_path.to_path_buf(),
            source,
        })
}

fn open_tag(path: &Path) -> Result<Tag> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Ok(Tag::new()),
        Err(source) => Err(DownloadError::TagOpen {
            path: path.to_path_buf(),
            source,
        }),
    }
}
