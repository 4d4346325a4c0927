use futures::stream::Stream;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::Result;

/// Audio extensions recognized by the scanner (lowercase).
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "aac", "ogg", "wav", "wma", "opus"];

/// True if `path` has a supported audio extension (case-insensitive).
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scans the given root directory recursively for audio files.
///
/// The walk is depth-first with entries sorted by file name, so two scans
/// of an unchanged tree yield the same order. Symlinks are followed.
/// Unreadable directories, dangling links and link loops are yielded as
/// [`Error::Walk`](crate::error::Error::Walk) items and the walk goes on.
pub fn scan(root: PathBuf) -> impl Stream<Item = Result<PathBuf>> {
    let (tx, rx) = mpsc::channel(100);

    // Spawn a blocking task to perform the synchronous file system traversal
    tokio::task::spawn_blocking(move || {
        let walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
        for entry in walker {
            let item: Result<PathBuf> = match entry {
                Ok(entry) if entry.file_type().is_file() && is_audio_file(entry.path()) => {
                    Ok(entry.into_path())
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(
                        target: "music_curator::scanner",
                        path = ?e.path(),
                        error = %e,
                        "Unreadable entry"
                    );
                    Err(e.into())
                }
            };
            // If the receiver is dropped, stop scanning.
            if tx.blocking_send(item).is_err() {
                break;
            }
        }
    });

    // Convert the mpsc Receiver into a Stream
    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use futures::StreamExt;
    use std::fs::File;
    use tempfile::tempdir;

    async fn scan_ok(root: &Path) -> Vec<PathBuf> {
        scan(root.to_path_buf())
            .map(|item| item.unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_scan_audio_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("song.mp3")).unwrap();
        File::create(root.join("music.flac")).unwrap();
        File::create(root.join("notes.txt")).unwrap(); // Should be ignored
        File::create(root.join("image.png")).unwrap(); // Should be ignored
        File::create(root.join("UPPERCASE.OGG")).unwrap(); // Case-insensitive
        File::create(root.join("voice.opus")).unwrap();
        File::create(root.join("old.wma")).unwrap();

        let subdir = root.join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("track.wav")).unwrap();
        File::create(subdir.join("clip.aac")).unwrap();
        File::create(subdir.join("ignore.doc")).unwrap(); // Should be ignored

        let paths: Vec<PathBuf> = scan_ok(root).await;
        assert_eq!(paths.len(), 7);

        let file_names: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(|s| s.to_string()))
            .collect();

        assert!(file_names.contains(&"UPPERCASE.OGG".to_string()));
        assert!(file_names.contains(&"clip.aac".to_string()));
        assert!(!file_names.contains(&"notes.txt".to_string()));
        assert!(!file_names.contains(&"image.png".to_string()));
    }

    #[tokio::test]
    async fn test_scan_order_is_deterministic() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("B Artist/Album")).unwrap();
        std::fs::create_dir_all(root.join("A Artist/Album")).unwrap();
        File::create(root.join("B Artist/Album/2.mp3")).unwrap();
        File::create(root.join("B Artist/Album/1.mp3")).unwrap();
        File::create(root.join("A Artist/Album/z.mp3")).unwrap();

        let first = scan_ok(root).await;
        let second = scan_ok(root).await;
        assert_eq!(first, second);

        let relative: Vec<_> = first
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("A Artist/Album/z.mp3"),
                PathBuf::from("B Artist/Album/1.mp3"),
                PathBuf::from("B Artist/Album/2.mp3"),
            ]
        );
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("a/b/Song.MP3")));
        assert!(is_audio_file(Path::new("x.m4a")));
        assert!(!is_audio_file(Path::new("cover.jpg")));
        assert!(!is_audio_file(Path::new("README")));
    }

    #[tokio::test]
    async fn test_missing_root_yields_walk_error() {
        let dir = tempdir().unwrap();
        let items: Vec<_> = scan(dir.path().join("gone")).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Walk(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_link_is_reported_and_walk_continues() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        File::create(root.join("a.mp3")).unwrap();
        std::os::unix::fs::symlink(root.join("missing.mp3"), root.join("b.mp3")).unwrap();
        File::create(root.join("c.mp3")).unwrap();

        let items: Vec<_> = scan(root.to_path_buf()).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), &root.join("a.mp3"));
        assert!(matches!(items[1], Err(Error::Walk(_))));
        assert_eq!(items[2].as_ref().unwrap(), &root.join("c.mp3"));
    }
}
