//! Sorting loose audio files into the `Artist/Album` layout.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use tracing::{debug, info, warn};

use super::{BatchRunner, require_dir};
use crate::error::Result;
use crate::metadata::{self, EmbeddedTags};
use crate::organizer;
use crate::providers::RecordingLookup;
use crate::scanner;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeStats {
    /// Files examined
    pub files_processed: usize,
    pub files_moved: usize,
    /// Files left in place (no artist, or an error)
    pub files_skipped: usize,
    pub folders_created: usize,
    /// Recording lookups made for files with missing tags
    pub lookups_made: usize,
    /// Failed moves plus unreadable entries under the source
    pub errors: usize,
}

/// Where one file should go.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    artist: String,
    album: Option<String>,
}

impl BatchRunner {
    /// Move every audio file under `source` to `root/Artist/Album/<filename>`.
    ///
    /// Artist and album come from tags; when either is missing the
    /// recording is looked up by title. Files with no artist are left in
    /// place. Existing files are never overwritten.
    pub async fn organize_unsorted(
        &self,
        lookup: &dyn RecordingLookup,
        source: &Path,
        root: &Path,
    ) -> Result<OrganizeStats> {
        require_dir(source, "source directory")?;
        require_dir(root, "destination root")?;

        // Listed up front: moved files may land back under `source`.
        let items: Vec<Result<PathBuf>> = scanner::scan(source.to_path_buf()).collect().await;
        let walk_errors = items.iter().filter(|item| item.is_err()).count();
        let files: Vec<PathBuf> = items.into_iter().filter_map(|item| item.ok()).collect();

        let total = files.len();
        let pacer = self.pacer(total);
        let mut stats = OrganizeStats {
            errors: walk_errors,
            ..OrganizeStats::default()
        };
        let mut seen_folders = HashSet::new();

        info!(target: "music_curator::batch", job = "organize", files = total, source = %source.display(), root = %root.display(), "Starting organize");

        for (i, path) in files.iter().enumerate() {
            if self.cancelled("organize", i, total) {
                break;
            }
            stats.files_processed += 1;

            let (placement, looked_up) = place(lookup, path).await;
            if looked_up {
                stats.lookups_made += 1;
            }

            match placement {
                None => {
                    debug!(target: "music_curator::batch", path = %path.display(), "No artist found, skipping");
                    stats.files_skipped += 1;
                }
                Some(placement) => match move_into_place(path, root, &placement, &mut seen_folders) {
                    Ok((dest, created)) => {
                        if created {
                            stats.folders_created += 1;
                        }
                        stats.files_moved += 1;
                        debug!(target: "music_curator::batch", from = %path.display(), to = %dest.display(), "Moved");
                    }
                    Err(e) => {
                        warn!(target: "music_curator::batch", path = %path.display(), error = %e, "Failed to organize file");
                        stats.errors += 1;
                        stats.files_skipped += 1;
                    }
                },
            }

            if looked_up {
                pacer.after_item(i).await;
            }
        }

        info!(
            target: "music_curator::batch",
            job = "organize",
            processed = stats.files_processed,
            moved = stats.files_moved,
            skipped = stats.files_skipped,
            folders = stats.folders_created,
            lookups = stats.lookups_made,
            errors = stats.errors,
            "Organize finished"
        );
        Ok(stats)
    }
}

/// Artist and album for `path`, and whether a lookup was made.
async fn place(lookup: &dyn RecordingLookup, path: &Path) -> (Option<Placement>, bool) {
    let tags = metadata::read_tags(path).unwrap_or_else(|e| {
        debug!("No usable tags: {}", e);
        EmbeddedTags::default()
    });
    let title = tags
        .title
        .clone()
        .unwrap_or_else(|| metadata::filename_title(path));
    let mut artist = tags.artist;
    let mut album = tags.album;

    let mut looked_up = false;
    if (artist.is_none() || album.is_none()) && !title.trim().is_empty() {
        looked_up = true;
        match lookup.find_recording(&title).await {
            Ok(Some(found)) => {
                artist = artist.or(found.artist);
                album = album.or(found.album);
            }
            Ok(None) => debug!(target: "music_curator::batch", title = %title, "No recording found"),
            Err(e) => warn!(target: "music_curator::batch", title = %title, error = %e, "Recording lookup failed"),
        }
    }

    let placement = artist
        .filter(|a| !a.trim().is_empty())
        .map(|artist| Placement { artist, album });
    (placement, looked_up)
}

/// Move `path` under `root/Artist/Album`. Returns the destination and
/// whether the album folder was created by this call.
fn move_into_place(
    path: &Path,
    root: &Path,
    placement: &Placement,
    seen_folders: &mut HashSet<PathBuf>,
) -> Result<(PathBuf, bool)> {
    let folder = organizer::album_dir(root, Some(&placement.artist), placement.album.as_deref());
    let created = if seen_folders.insert(folder.clone()) {
        organizer::ensure_dir(&folder)?
    } else {
        false
    };

    let Some(filename) = path.file_name() else {
        return Err(crate::error::Error::metadata(path, "path has no file name"));
    };
    let dest = organizer::move_file(path, &folder.join(filename))?;
    Ok((dest, created))
}
