//! File organization and movement utilities.
//!
//! The library layout is `{root}/{Artist}/{Album}/{Title}.{ext}`, with every
//! component passed through [`sanitize`]. Moves never overwrite: a taken
//! destination gets a ` (n)` suffix before the extension.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};
use crate::model::{UNKNOWN_ALBUM, UNKNOWN_ARTIST};

/// Replacement for names that sanitize to nothing.
const EMPTY_NAME: &str = "Unknown";

/// Make `name` safe as a single path component.
///
/// Removes `< > : " / \ | ? *`, trims leading and trailing dots and spaces,
/// and collapses whitespace runs. Empty results become `"Unknown"`.
pub fn sanitize(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    let trimmed = stripped.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        EMPTY_NAME.to_string()
    } else {
        collapsed
    }
}

/// `root/Artist/Album` for the given (possibly missing) names.
pub fn album_dir(root: &Path, artist: Option<&str>, album: Option<&str>) -> PathBuf {
    let artist = artist.map(str::trim).filter(|a| !a.is_empty()).unwrap_or(UNKNOWN_ARTIST);
    let album = album.map(str::trim).filter(|a| !a.is_empty()).unwrap_or(UNKNOWN_ALBUM);
    root.join(sanitize(artist)).join(sanitize(album))
}

/// `path` itself if free, else the first free `stem (n).ext` with n ≥ 1.
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut n = 1;
    loop {
        let name = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Create `dir` (and parents). Returns true if it did not exist before.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).with_context(format!("Failed to create directory: {:?}", dir))?;
    Ok(true)
}

/// Move `source` to `destination` without overwriting.
///
/// Parent directories are created. Returns the path actually written,
/// which carries a ` (n)` suffix when `destination` was taken.
pub fn move_file(source: &Path, destination: &Path) -> Result<PathBuf> {
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }

    let dest_path = unique_destination(destination);

    if let Err(_e) = fs::rename(source, &dest_path) {
        // If rename fails (cross-device), try copy + delete
        fs::copy(source, &dest_path)
            .with_context(format!("Failed to copy file to: {:?}", dest_path))?;
        fs::remove_file(source)
            .with_context(format!("Failed to remove source file: {:?}", source))?;
    }

    Ok(dest_path)
}

/// `path` relative to `root` with `/` separators, or None when `path` is
/// not under `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
