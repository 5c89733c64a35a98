use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::info;

use crate::index::count_videos;
use crate::resolve::normalize;

/// Shared handle to the active video root.
///
/// Handlers take a snapshot with [`VideoRoot::current`] and never hold the
/// lock across I/O, so a concurrent [`VideoRoot::set`] is last-writer-wins and
/// in-flight requests may observe either value.
#[derive(Debug, Clone)]
pub struct VideoRoot {
    inner: Arc<RwLock<PathBuf>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootChange {
    pub root: PathBuf,
    pub count: usize,
}

#[derive(Debug, Error)]
pub enum SetRootError {
    #[error("new root is required")]
    Missing,
    #[error("not an existing directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to index new root: {0}")]
    Index(anyhow::Error),
}

impl VideoRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(normalize(&path.into()))),
        }
    }

    pub async fn current(&self) -> PathBuf {
        self.inner.read().await.clone()
    }

    /// Replace the active root with `candidate` if it is an existing directory,
    /// then count the videos below it.
    ///
    /// On validation failure the active root is left untouched.
    pub async fn set(&self, candidate: &str) -> Result<RootChange, SetRootError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(SetRootError::Missing);
        }

        let root = absolutize(Path::new(candidate))
            .map_err(|_| SetRootError::NotADirectory(PathBuf::from(candidate)))?;
        match fs::metadata(&root).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Err(SetRootError::NotADirectory(root)),
        }

        *self.inner.write().await = root.clone();
        info!(root = %root.display(), "video root changed");

        let count = count_videos(&root).await.map_err(SetRootError::Index)?;
        Ok(RootChange { root, count })
    }
}

fn absolutize(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn set_swaps_root_and_counts_videos() {
        let old = tempdir().unwrap();
        let new = tempdir().unwrap();
        std::fs::write(new.path().join("a.mp4"), b"x").unwrap();
        std::fs::create_dir_all(new.path().join("sub")).unwrap();
        std::fs::write(new.path().join("sub/b.webm"), b"x").unwrap();

        let root = VideoRoot::new(old.path());
        let change = root.set(new.path().to_str().unwrap()).await.unwrap();

        assert_eq!(change.count, 2);
        assert_eq!(change.root, normalize(new.path()));
        assert_eq!(root.current().await, normalize(new.path()));
    }

    #[tokio::test]
    async fn set_to_file_leaves_root_untouched() {
        let old = tempdir().unwrap();
        let file = old.path().join("clip.mp4");
        std::fs::write(&file, b"x").unwrap();

        let root = VideoRoot::new(old.path());
        let err = root.set(file.to_str().unwrap()).await.unwrap_err();

        assert!(matches!(err, SetRootError::NotADirectory(_)));
        assert_eq!(root.current().await, normalize(old.path()));
    }

    #[tokio::test]
    async fn set_rejects_blank_and_missing_paths() {
        let old = tempdir().unwrap();
        let root = VideoRoot::new(old.path());

        assert!(matches!(root.set("   ").await, Err(SetRootError::Missing)));
        let missing = old.path().join("does-not-exist");
        assert!(matches!(
            root.set(missing.to_str().unwrap()).await,
            Err(SetRootError::NotADirectory(_))
        ));
        assert_eq!(root.current().await, normalize(old.path()));
    }

    #[tokio::test]
    async fn clones_share_the_same_root() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let root = VideoRoot::new(a.path());
        let handle = root.clone();

        handle.set(b.path().to_str().unwrap()).await.unwrap();
        assert_eq!(root.current().await, normalize(b.path()));
    }
}
