use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

/// Extensions (lowercase, without the dot) treated as playable video.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "ogg", "mov", "m4v", "mkv"];

/// One discovered video file.
///
/// Field names on the wire are the ones the browser client reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoEntry {
    /// Path relative to the root, always `/`-separated.
    #[serde(rename = "relPath")]
    pub relative_path: String,
    pub name: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "mtimeMs")]
    pub modified_at_millis: i64,
}

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Recursively collect absolute paths of video files under `root`.
///
/// Failing to read `root` itself is an error. Nested directories that cannot
/// be read are logged and skipped. Order is unspecified.
pub async fn walk_videos(root: &Path) -> Result<Vec<PathBuf>> {
    walk_dir(root.to_path_buf(), true)
        .await
        .with_context(|| format!("failed to read video root {}", root.display()))
}

/// Errors listing `dir` abort the walk only at the top level; a nested
/// directory keeps whatever it had collected before the failure.
fn walk_dir(dir: PathBuf, top_level: bool) -> BoxFuture<'static, io::Result<Vec<PathBuf>>> {
    async move {
        let mut reader = fs::read_dir(&dir).await?;
        let mut files = Vec::new();
        let mut subdirs = Vec::new();

        loop {
            let entry = match reader.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) if top_level => return Err(err),
                Err(err) => {
                    warn!(dir = %dir.display(), "stopped listing directory early: {err}");
                    break;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!(path = %path.display(), "skipping entry with unreadable type: {err}");
                    continue;
                }
            };

            // Symlinked directories are not followed.
            if file_type.is_dir() {
                subdirs.push(path);
            } else if is_video(&path) {
                files.push(path);
            }
        }

        let nested = join_all(subdirs.into_iter().map(|subdir| async move {
            match walk_dir(subdir.clone(), false).await {
                Ok(found) => found,
                Err(err) => {
                    warn!(dir = %subdir.display(), "skipping unreadable directory: {err}");
                    Vec::new()
                }
            }
        }))
        .await;

        files.extend(nested.into_iter().flatten());
        Ok(files)
    }
    .boxed()
}

/// List every video under `root` with its metadata.
///
/// A root that does not exist, or is not a directory, yields an empty list.
pub async fn index_videos(root: &Path) -> Result<Vec<VideoEntry>> {
    if !is_existing_dir(root).await? {
        debug!(root = %root.display(), "video root missing, returning empty listing");
        return Ok(Vec::new());
    }

    let files = walk_videos(root).await?;
    let entries = join_all(files.iter().map(|path| describe(root, path))).await;

    Ok(entries.into_iter().flatten().collect())
}

/// Number of videos under `root`, using a single walk.
pub async fn count_videos(root: &Path) -> Result<usize> {
    if !is_existing_dir(root).await? {
        return Ok(0);
    }
    Ok(walk_videos(root).await?.len())
}

async fn is_existing_dir(path: &Path) -> Result<bool> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("failed to stat {}", path.display())),
    }
}

async fn describe(root: &Path, path: &Path) -> Option<VideoEntry> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!(path = %path.display(), "failed to stat video: {err}");
            return None;
        }
    };
    if !metadata.is_file() {
        return None;
    }

    let relative_path = relative_path(root, path)?;
    let name = path.file_name()?.to_string_lossy().into_owned();
    let modified_at_millis = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|dur| dur.as_millis() as i64)
        .unwrap_or_default();

    Some(VideoEntry {
        relative_path,
        name,
        size_bytes: metadata.len(),
        modified_at_millis,
    })
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = rel
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
