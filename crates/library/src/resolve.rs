use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("missing or invalid path")]
    InvalidPath,
    #[error("path contains a parent-directory segment")]
    Traversal,
    #[error("path resolves outside the video root")]
    OutsideRoot,
    #[error("no such video: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A confined, existing regular file under the video root.
#[derive(Debug, Clone)]
pub struct ResolvedVideo {
    pub path: PathBuf,
    pub size: u64,
}

/// Lexically normalize a path: drop `.` segments and fold `..` into its parent.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a client-supplied relative path under `root` without touching the
/// filesystem.
///
/// The resolved path must lie strictly below `root`, compared by path
/// components, so `/videos` never admits `/videos-private`.
pub fn confine(root: &Path, rel: &str) -> Result<PathBuf, ResolveError> {
    if rel.trim().is_empty() || rel.contains('\0') {
        return Err(ResolveError::InvalidPath);
    }
    if rel.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(ResolveError::Traversal);
    }

    let root = normalize(root);
    // An absolute `rel` replaces the root here and fails the check below.
    let resolved = normalize(&root.join(rel));
    if resolved == root || !resolved.starts_with(&root) {
        return Err(ResolveError::OutsideRoot);
    }
    Ok(resolved)
}

/// [`confine`] `rel` under `root` and check that it names a regular file.
pub async fn resolve_video(root: &Path, rel: &str) -> Result<ResolvedVideo, ResolveError> {
    let path = confine(root, rel)?;
    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ResolveError::NotFound(path));
        }
        Err(err) => return Err(err.into()),
    };
    if !metadata.is_file() {
        return Err(ResolveError::NotFound(path));
    }

    Ok(ResolvedVideo {
        path,
        size: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn rejects_parent_segments_before_resolution() {
        let root = Path::new("/videos");
        for rel in ["..", "../secret.mp4", "a/../../b.mp4", "sub/..", "a\\..\\b.mp4"] {
            assert!(
                matches!(confine(root, rel), Err(ResolveError::Traversal)),
                "{rel} should be rejected as traversal"
            );
        }
    }

    #[test]
    fn dots_inside_a_name_are_not_traversal() {
        let resolved = confine(Path::new("/videos"), "clip..final.mp4").unwrap();
        assert_eq!(resolved, PathBuf::from("/videos/clip..final.mp4"));
    }

    #[test]
    fn rejects_empty_path() {
        assert!(matches!(confine(Path::new("/videos"), ""), Err(ResolveError::InvalidPath)));
        assert!(matches!(confine(Path::new("/videos"), "  "), Err(ResolveError::InvalidPath)));
    }

    #[test]
    fn sibling_with_shared_prefix_is_outside_root() {
        let root = Path::new("/videos");
        assert!(matches!(
            confine(root, "/videos-private/clip.mp4"),
            Err(ResolveError::OutsideRoot)
        ));
        assert!(matches!(confine(root, "/etc/passwd"), Err(ResolveError::OutsideRoot)));
    }

    #[test]
    fn root_itself_is_not_servable() {
        let root = Path::new("/videos");
        assert!(matches!(confine(root, "."), Err(ResolveError::OutsideRoot)));
        assert!(matches!(confine(root, "/videos"), Err(ResolveError::OutsideRoot)));
    }

    #[test]
    fn absolute_path_inside_root_is_accepted() {
        let resolved = confine(Path::new("/videos"), "/videos/a/b.mp4").unwrap();
        assert_eq!(resolved, PathBuf::from("/videos/a/b.mp4"));
    }

    #[tokio::test]
    async fn resolves_existing_file_with_size() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/clip.mp4"), [1u8; 12]).unwrap();

        let video = resolve_video(dir.path(), "nested/clip.mp4").await.unwrap();
        assert_eq!(video.size, 12);
        assert!(video.path.ends_with("nested/clip.mp4"));
    }

    #[tokio::test]
    async fn missing_file_and_directories_are_not_found() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();

        assert!(matches!(
            resolve_video(dir.path(), "missing.mp4").await,
            Err(ResolveError::NotFound(_))
        ));
        assert!(matches!(
            resolve_video(dir.path(), "nested").await,
            Err(ResolveError::NotFound(_))
        ));
    }
}
