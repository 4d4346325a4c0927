//! Audio file metadata reading.
//!
//! Uses the lofty crate for format-independent tag access. Tags are only
//! one of three sources; the folder layout (`root/Artist/Album/File`) and
//! the filename fill whatever the tags leave empty, in that order.

use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::Path;

use crate::error::{Error, Result};
use crate::normalize::clean_filename_title;

/// Values read from embedded tags. Blank values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
}

/// Artist and album implied by a file's position under the library root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathHints {
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Merged metadata for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Tag title, else the cleaned filename, else the raw filename
    pub track_name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read title, artist, album and genre from the file's tags.
pub fn read_tags(path: &Path) -> Result<EmbeddedTags> {
    // Probe the file to determine format and read tags
    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("Failed to open file for probing: {e}")))?
        .read()
        .map_err(|e| Error::metadata(path, format!("Failed to read file metadata: {e}")))?;

    // Get the primary tag, or fall back to the first available tag
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return Ok(EmbeddedTags::default());
    };

    Ok(EmbeddedTags {
        title: non_blank(tag.title().map(|s| s.to_string())),
        artist: non_blank(tag.artist().map(|s| s.to_string())),
        album: non_blank(tag.album().map(|s| s.to_string())),
        genre: non_blank(tag.genre().map(|s| s.to_string())),
    })
}

/// Folder-derived artist/album for `path` under `root`.
///
/// `Artist/File` gives the artist; `Artist/Album/.../File` gives both.
/// Files directly in the root, or outside it, give nothing.
pub fn path_hints(root: &Path, path: &Path) -> PathHints {
    let Ok(relative) = path.strip_prefix(root) else {
        return PathHints::default();
    };
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().trim().to_string())
        .collect();

    PathHints {
        artist: (parts.len() >= 2).then(|| parts[0].clone()).filter(|a| !a.is_empty()),
        album: (parts.len() >= 3).then(|| parts[1].clone()).filter(|a| !a.is_empty()),
    }
}

/// Title derived from the filename alone, never empty for a named file.
pub fn filename_title(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned = clean_filename_title(&filename);
    if cleaned.is_empty() { filename } else { cleaned }
}

/// Merge tags, path hints and filename with that precedence.
pub fn merge(tags: EmbeddedTags, hints: PathHints, path: &Path) -> FileMetadata {
    FileMetadata {
        track_name: tags.title.unwrap_or_else(|| filename_title(path)),
        artist: tags.artist.or(hints.artist),
        album: tags.album.or(hints.album),
        genre: tags.genre,
    }
}

/// Metadata for a file inside the library at `root`.
///
/// Unreadable tags are not an error; extraction falls back to the path.
pub fn extract(root: &Path, path: &Path) -> FileMetadata {
    let tags = match read_tags(path) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::debug!("No usable tags: {}", e);
            EmbeddedTags::default()
        }
    };
    merge(tags, path_hints(root, path), path)
}
