//! Index caching for fast startup.
//!
//! The built [`TextureIndex`] is persisted next to the packs so later runs
//! skip the directory walk entirely. The cache is valid for as long as the
//! file exists: it is never invalidated automatically when pack contents
//! change, only by an explicit rescan.

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{IndexWarning, MixError, MixResult};

use super::builder::{IndexBuildReport, IndexBuilder};
use super::texture_index::TextureIndex;

/// Default cache file name inside the mix directory.
pub const DEFAULT_CACHE_FILE: &str = "mix_map.bin";

/// Magic bytes identifying a cache written by this crate.
const CACHE_MAGIC: [u8; 4] = *b"PMIX";

/// Serialized cache file contents.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedIndex {
    magic: [u8; 4],

    /// Packmixer version that wrote the cache.
    pub version: String,

    /// When the cache was created (secs since UNIX_EPOCH).
    pub created_at_secs: u64,

    /// The cached index.
    pub index: TextureIndex,
}

impl CachedIndex {
    /// Wrap an index for saving.
    pub fn new(index: TextureIndex) -> Self {
        let created_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            magic: CACHE_MAGIC,
            version: crate::VERSION.to_string(),
            created_at_secs,
            index,
        }
    }

    /// Get cache age in seconds.
    pub fn age_secs(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        now.saturating_sub(self.created_at_secs)
    }

    /// Get human-readable cache age.
    pub fn age_human(&self) -> String {
        let secs = self.age_secs();

        if secs < 60 {
            format!("{}s ago", secs)
        } else if secs < 3600 {
            format!("{}m ago", secs / 60)
        } else if secs < 86400 {
            format!("{}h ago", secs / 3600)
        } else {
            format!("{}d ago", secs / 86400)
        }
    }
}

/// Where a loaded index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Read from the cache file; pack trees were not touched.
    Cache,
    /// Built by scanning the packs.
    Scan,
}

/// An index loaded through the cache, with any warnings raised on the way.
#[derive(Debug, Clone)]
pub struct IndexLoad {
    /// The index.
    pub index: TextureIndex,

    /// Whether the index came from the cache or a fresh scan.
    pub source: IndexSource,

    /// Non-fatal problems (skipped entries, corrupt cache, failed save).
    pub warnings: Vec<IndexWarning>,
}

/// Persistent index cache at a fixed file location.
///
/// The cache owns no global state; whoever constructs it decides where the
/// artifact lives and when it is invalidated.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    /// Create a cache backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a cache at the default location inside `mix_dir`.
    pub fn in_mix_dir(mix_dir: &Path) -> Self {
        Self::new(mix_dir.join(DEFAULT_CACHE_FILE))
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a cache artifact exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the cache file.
    pub fn read(&self) -> MixResult<CachedIndex> {
        let read_failed = |reason: String| MixError::CacheRead {
            path: self.path.clone(),
            reason,
        };

        let file = std::fs::File::open(&self.path).map_err(|e| read_failed(e.to_string()))?;
        let file_len = file
            .metadata()
            .map_err(|e| read_failed(e.to_string()))?
            .len();
        let reader = BufReader::new(file);

        // Bounding by the file size stops a corrupt length prefix from
        // triggering a huge allocation
        let cached: CachedIndex = bincode::DefaultOptions::new()
            .with_limit(file_len)
            .deserialize_from(reader)
            .map_err(|e| read_failed(format!("failed to deserialize index cache: {}", e)))?;

        if cached.magic != CACHE_MAGIC {
            return Err(read_failed("not a packmixer index cache".to_string()));
        }

        Ok(cached)
    }

    /// Load the cached index.
    pub fn load(&self) -> MixResult<TextureIndex> {
        let cached = self.read()?;
        info!(
            path = %self.path.display(),
            age = %cached.age_human(),
            packs = cached.index.pack_count(),
            textures = cached.index.path_count(),
            "Using cached texture index"
        );
        Ok(cached.index)
    }

    /// Save an index to the cache file.
    pub fn save(&self, index: &TextureIndex) -> MixResult<()> {
        let write_failed = |reason: String| MixError::CacheWrite {
            path: self.path.clone(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        let file = std::fs::File::create(&temp_path).map_err(|e| write_failed(e.to_string()))?;
        let mut writer = BufWriter::new(file);

        let cached = CachedIndex::new(index.clone());
        let written = bincode::DefaultOptions::new()
            .serialize_into(&mut writer, &cached)
            .map_err(|e| format!("failed to serialize index cache: {}", e))
            .and_then(|()| writer.flush().map_err(|e| e.to_string()));
        if let Err(reason) = written {
            drop(writer);
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_failed(reason));
        }
        drop(writer);

        std::fs::rename(&temp_path, &self.path).map_err(|e| write_failed(e.to_string()))?;

        info!(
            path = %self.path.display(),
            packs = index.pack_count(),
            textures = index.path_count(),
            "Saved texture index to cache"
        );

        Ok(())
    }

    /// Delete the cache artifact.
    ///
    /// Returns `true` if a file was removed, `false` if there was none.
    pub fn invalidate(&self) -> MixResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Deleted index cache");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MixError::RemoveFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Return the cached index, or build and persist one on a miss.
    ///
    /// An unreadable cache counts as a miss and is overwritten.
    pub fn load_or_build(&self, builder: &IndexBuilder) -> MixResult<IndexLoad> {
        let mut warnings = Vec::new();

        if self.exists() {
            match self.load() {
                Ok(index) => {
                    return Ok(IndexLoad {
                        index,
                        source: IndexSource::Cache,
                        warnings,
                    })
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Index cache is corrupt, rebuilding"
                    );
                    warnings.push(IndexWarning::CacheCorrupt {
                        path: self.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let report = builder.build()?;
        Ok(self.persist(report, warnings))
    }

    /// Rescan and replace the cache with the fresh index.
    ///
    /// The old artifact stays in place until the new index is ready, so a
    /// cancelled or failed scan leaves it untouched. When the fresh index
    /// cannot be saved, the stale artifact is deleted instead so the next
    /// load does not pick it up.
    pub fn rebuild(&self, builder: &IndexBuilder) -> MixResult<IndexLoad> {
        let report = builder.build()?;
        let mut warnings = report.warnings;

        if let Err(e) = self.save(&report.index) {
            warn!(error = %e, "Failed to save texture index cache");
            warnings.push(IndexWarning::CacheWriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            });

            if let Err(e) = self.invalidate() {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to delete stale index cache"
                );
                warnings.push(IndexWarning::CacheInvalidateFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(IndexLoad {
            index: report.index,
            source: IndexSource::Scan,
            warnings,
        })
    }

    fn persist(&self, report: IndexBuildReport, mut warnings: Vec<IndexWarning>) -> IndexLoad {
        warnings.extend(report.warnings);

        if let Err(e) = self.save(&report.index) {
            warn!(error = %e, "Failed to save texture index cache");
            warnings.push(IndexWarning::CacheWriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            });
        }

        IndexLoad {
            index: report.index,
            source: IndexSource::Scan,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Candidate;
    use tempfile::TempDir;

    const STONE: &str = "assets/minecraft/textures/block/stone.png";

    fn touch(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn sample_index() -> TextureIndex {
        let mut index = TextureIndex::new();
        index.add_pack("A");
        index.insert(STONE, Candidate::new("A", "/mix/A/stone.png"));
        index.add_pack("B");
        index.insert(STONE, Candidate::new("B", "/mix/B/stone.png"));
        index
    }

    #[test]
    fn test_cache_save_and_load() {
        let temp = TempDir::new().unwrap();
        let cache = IndexCache::in_mix_dir(temp.path());
        let index = sample_index();

        cache.save(&index).unwrap();

        assert!(cache.exists());
        assert!(!temp.path().join("mix_map.tmp").exists());
        assert_eq!(cache.load().unwrap(), index);
    }

    #[test]
    fn test_load_or_build_uses_cache_without_scanning() {
        let temp = TempDir::new().unwrap();
        let cache = IndexCache::in_mix_dir(temp.path());
        let index = sample_index();
        cache.save(&index).unwrap();

        // Mix dir has no packs, so a scan would produce an empty index
        let load = cache.load_or_build(&IndexBuilder::new(temp.path())).unwrap();

        assert_eq!(load.source, IndexSource::Cache);
        assert_eq!(load.index, index);
    }

    #[test]
    fn test_load_or_build_persists_on_miss() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &format!("A/{}", STONE), b"a");
        let cache = IndexCache::in_mix_dir(temp.path());

        let load = cache.load_or_build(&IndexBuilder::new(temp.path())).unwrap();

        assert_eq!(load.source, IndexSource::Scan);
        assert_eq!(load.index.candidates(STONE).len(), 1);
        assert!(cache.exists());
        assert_eq!(cache.load().unwrap(), load.index);
    }

    #[test]
    fn test_corrupt_cache_is_rebuilt() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &format!("A/{}", STONE), b"a");
        let cache = IndexCache::in_mix_dir(temp.path());
        std::fs::write(cache.path(), b"garbage").unwrap();

        let load = cache.load_or_build(&IndexBuilder::new(temp.path())).unwrap();

        assert_eq!(load.source, IndexSource::Scan);
        assert!(matches!(
            load.warnings.as_slice(),
            [IndexWarning::CacheCorrupt { .. }]
        ));
        assert_eq!(cache.load().unwrap(), load.index);
    }

    #[test]
    fn test_invalidate() {
        let temp = TempDir::new().unwrap();
        let cache = IndexCache::in_mix_dir(temp.path());

        assert!(!cache.invalidate().unwrap());
        cache.save(&sample_index()).unwrap();
        assert!(cache.invalidate().unwrap());
        assert!(!cache.exists());
    }

    #[test]
    fn test_rebuild_replaces_stale_cache() {
        let temp = TempDir::new().unwrap();
        let cache = IndexCache::in_mix_dir(temp.path());
        cache.save(&sample_index()).unwrap();

        touch(temp.path(), &format!("Z/{}", STONE), b"z");
        let load = cache.rebuild(&IndexBuilder::new(temp.path())).unwrap();

        assert_eq!(load.source, IndexSource::Scan);
        assert_eq!(load.index.pack_names(), &["Z"]);
        assert_eq!(cache.load().unwrap(), load.index);
    }

    #[test]
    fn test_cancelled_rebuild_keeps_cache() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), &format!("Z/{}", STONE), b"z");
        let cache = IndexCache::in_mix_dir(temp.path());
        let index = sample_index();
        cache.save(&index).unwrap();

        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();
        let builder = IndexBuilder::new(temp.path()).with_cancellation(token);

        assert!(matches!(cache.rebuild(&builder), Err(MixError::Cancelled)));
        assert_eq!(cache.load().unwrap(), index);
    }

    #[test]
    fn test_cache_age_human() {
        let mut cached = CachedIndex::new(TextureIndex::new());

        let age = cached.age_human();
        assert!(age.ends_with("s ago"));

        // Simulate 2 hours ago
        cached.created_at_secs -= 7200;
        assert_eq!(cached.age_human(), "2h ago");
    }
}
