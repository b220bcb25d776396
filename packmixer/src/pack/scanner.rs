//! Texture scanning for a single pack.
//!
//! Walks a pack tree with `walkdir`, keeping every file the classifier
//! accepts. Unreadable directories are skipped and reported as warnings so
//! one broken subtree never aborts the scan of its siblings.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::{is_texture_asset, normalize_relative};
use crate::error::{IndexWarning, MixError, MixResult};

/// A texture found inside a pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTexture {
    /// Forward-slash path relative to the pack root.
    pub rel_path: String,

    /// Absolute path of the file.
    pub path: PathBuf,
}

/// Result of scanning one pack.
#[derive(Debug, Clone, Default)]
pub struct PackScan {
    /// Textures in walk order (file name order within each directory).
    pub textures: Vec<ScannedTexture>,

    /// Entries that had to be skipped.
    pub warnings: Vec<IndexWarning>,
}

impl PackScan {
    /// Number of textures found.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

/// Scans pack directories for texture assets.
#[derive(Debug, Clone, Default)]
pub struct PackScanner {
    cancellation: Option<CancellationToken>,
}

impl PackScanner {
    /// Create a scanner that always runs to completion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop walking as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(|t| t.is_cancelled())
            .unwrap_or(false)
    }

    /// Scan a pack root.
    ///
    /// A pack without any textures yields an empty scan. Returns
    /// [`MixError::Cancelled`] if the token fires mid-walk; the partial
    /// result is dropped.
    pub fn scan(&self, pack_root: &Path) -> MixResult<PackScan> {
        let mut scan = PackScan::default();

        let walker = WalkDir::new(pack_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        for entry in walker {
            if self.is_cancelled() {
                return Err(MixError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| pack_root.to_path_buf());
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable pack entry"
                    );
                    scan.warnings.push(IndexWarning::UnreadableEntry {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(pack_root) else {
                continue;
            };

            if !is_texture_asset(relative) {
                continue;
            }

            match normalize_relative(relative) {
                Some(rel_path) => scan.textures.push(ScannedTexture {
                    rel_path,
                    path: entry.path().to_path_buf(),
                }),
                None => {
                    warn!(path = %entry.path().display(), "Skipping non UTF-8 texture path");
                    scan.warnings.push(IndexWarning::NonUtf8Path {
                        path: entry.path().to_path_buf(),
                    });
                }
            }
        }

        debug!(
            pack = %pack_root.display(),
            textures = scan.textures.len(),
            skipped = scan.warnings.len(),
            "Pack scan complete"
        );

        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_collects_textures_only() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "assets/minecraft/textures/block/stone.png", b"stone");
        touch(root, "assets/minecraft/textures/block/dirt.PNG", b"dirt");
        touch(root, "assets/minecraft/textures/block/stone.png.mcmeta", b"{}");
        touch(root, "assets/minecraft/models/block/stone.json", b"{}");
        touch(root, "pack.png", b"icon");
        touch(root, "pack.mcmeta", b"{}");

        let scan = PackScanner::new().scan(root).unwrap();
        let rels: Vec<_> = scan.textures.iter().map(|t| t.rel_path.as_str()).collect();

        assert_eq!(
            rels,
            vec![
                "assets/minecraft/textures/block/dirt.PNG",
                "assets/minecraft/textures/block/stone.png",
            ]
        );
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn test_scan_records_absolute_paths() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "assets/m/textures/a.png", b"a");

        let scan = PackScanner::new().scan(temp.path()).unwrap();

        assert_eq!(scan.texture_count(), 1);
        assert_eq!(
            scan.textures[0].path,
            temp.path().join("assets/m/textures/a.png")
        );
        assert_eq!(std::fs::read(&scan.textures[0].path).unwrap(), b"a");
    }

    #[test]
    fn test_empty_pack() {
        let temp = TempDir::new().unwrap();
        let scan = PackScanner::new().scan(temp.path()).unwrap();
        assert_eq!(scan.texture_count(), 0);
    }

    #[test]
    fn test_cancelled_scan() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "assets/m/textures/a.png", b"a");

        let token = CancellationToken::new();
        token.cancel();

        let result = PackScanner::new().with_cancellation(token).scan(temp.path());
        assert!(matches!(result, Err(MixError::Cancelled)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subtree_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "assets/m/textures/ok/a.png", b"a");

        // Points back at an ancestor, so walking it would never end
        let looped = root.join("assets/m/textures/loop");
        std::os::unix::fs::symlink(root.join("assets"), &looped).unwrap();

        let scan = PackScanner::new().scan(root).unwrap();

        let rels: Vec<_> = scan.textures.iter().map(|t| t.rel_path.as_str()).collect();
        assert_eq!(rels, vec!["assets/m/textures/ok/a.png"]);
        assert_eq!(scan.warnings.len(), 1);
        assert!(matches!(
            &scan.warnings[0],
            IndexWarning::UnreadableEntry { path, .. } if path == &looped
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "assets/m/textures/ok/a.png", b"a");
        let dangling = root.join("assets/m/textures/gone");
        std::os::unix::fs::symlink(root.join("missing"), &dangling).unwrap();

        let scan = PackScanner::new().scan(root).unwrap();

        assert_eq!(scan.texture_count(), 1);
        assert!(matches!(
            scan.warnings.as_slice(),
            [IndexWarning::UnreadableEntry { path, .. }] if path == &dangling
        ));
    }
}
