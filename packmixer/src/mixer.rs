//! High-level mixing session.
//!
//! [`Mixer`] ties the engine together for one mix directory and one output
//! directory: it owns the index cache, keeps the current index in memory,
//! and routes selection changes through the applier after validating them
//! against the index.
//!
//! # Example
//!
//! ```ignore
//! use packmixer::{BuildMode, Mixer, MixerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let mixer = Mixer::open(MixerConfig::new("/mc/MixDir", "/mc/resourcepacks/Mixed"))?;
//!
//! let build = mixer.spawn_build(BuildMode::LoadOrBuild, CancellationToken::new());
//! let load = build.wait().await?;
//! println!("{} textures", load.index.path_count());
//!
//! mixer.apply_selection("assets/minecraft/textures/block/stone.png", "B")?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogFilter};
use crate::config::ConfigFile;
use crate::error::{MixError, MixResult};
use crate::index::{IndexBuilder, IndexCache, IndexLoad, TextureIndex, DEFAULT_CACHE_FILE};
use crate::selection::{self, SelectOutcome, SelectionMap, SelectionState};

/// Directories and options for a [`Mixer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerConfig {
    pub mix_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Index cache file; defaults to `mix_dir/mix_map.bin`.
    pub cache_path: PathBuf,
    /// Scan packs concurrently.
    pub parallel: bool,
}

impl MixerConfig {
    pub fn new(mix_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let mix_dir = mix_dir.into();
        Self {
            cache_path: mix_dir.join(DEFAULT_CACHE_FILE),
            mix_dir,
            output_dir: output_dir.into(),
            parallel: true,
        }
    }

    /// Derive settings from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            mix_dir: config.paths.mix_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            cache_path: config.cache_path(),
            parallel: config.scan.parallel,
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// How a build treats an existing cache artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Use the cache if present, scan otherwise.
    LoadOrBuild,
    /// Discard the cache and rescan.
    Rebuild,
}

struct MixerInner {
    config: MixerConfig,
    cache: IndexCache,
    current: RwLock<Option<Arc<TextureIndex>>>,
}

/// A mixing session over one mix directory and one output directory.
///
/// Cheap to clone; clones share the in-memory index.
#[derive(Clone)]
pub struct Mixer {
    inner: Arc<MixerInner>,
}

impl Mixer {
    /// Open a session, creating both directories if needed.
    pub fn open(config: MixerConfig) -> MixResult<Self> {
        for dir in [&config.mix_dir, &config.output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| MixError::CreateDirFailed {
                path: dir.clone(),
                source: e,
            })?;
        }

        let cache = IndexCache::new(&config.cache_path);
        debug!(
            mix_dir = %config.mix_dir.display(),
            output_dir = %config.output_dir.display(),
            cache = %cache.path().display(),
            "Opened mixer"
        );

        Ok(Self {
            inner: Arc::new(MixerInner {
                config,
                cache,
                current: RwLock::new(None),
            }),
        })
    }

    pub fn config(&self) -> &MixerConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &IndexCache {
        &self.inner.cache
    }

    pub fn output_dir(&self) -> &Path {
        &self.inner.config.output_dir
    }

    /// The index currently held in memory, if one was loaded.
    pub fn current_index(&self) -> Option<Arc<TextureIndex>> {
        self.inner.current.read().clone()
    }

    fn builder(&self, cancellation: CancellationToken) -> IndexBuilder {
        IndexBuilder::new(&self.inner.config.mix_dir)
            .parallel(self.inner.config.parallel)
            .with_cancellation(cancellation)
    }

    /// Load or rebuild the index, blocking the caller.
    ///
    /// On success the in-memory index is replaced. A cancelled or failed
    /// build leaves the previous index in place.
    pub fn build(&self, mode: BuildMode, cancellation: CancellationToken) -> MixResult<IndexLoad> {
        let builder = self.builder(cancellation);
        let load = match mode {
            BuildMode::LoadOrBuild => self.inner.cache.load_or_build(&builder)?,
            BuildMode::Rebuild => self.inner.cache.rebuild(&builder)?,
        };

        *self.inner.current.write() = Some(Arc::new(load.index.clone()));
        info!(
            source = ?load.source,
            textures = load.index.path_count(),
            warnings = load.warnings.len(),
            "Texture index ready"
        );
        Ok(load)
    }

    /// Run [`Mixer::build`] on the blocking thread pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_build(&self, mode: BuildMode, cancellation: CancellationToken) -> BackgroundBuild {
        let mixer = self.clone();
        let token = cancellation.clone();
        let handle = tokio::task::spawn_blocking(move || mixer.build(mode, token));

        BackgroundBuild {
            cancellation,
            handle,
        }
    }

    /// The in-memory index, loading it through the cache on first use.
    pub fn index(&self) -> MixResult<Arc<TextureIndex>> {
        if let Some(index) = self.current_index() {
            return Ok(index);
        }
        self.build(BuildMode::LoadOrBuild, CancellationToken::new())?;
        Ok(self.current_index().unwrap_or_default())
    }

    /// Discard the cache and rescan all packs.
    pub fn rescan(&self) -> MixResult<IndexLoad> {
        self.build(BuildMode::Rebuild, CancellationToken::new())
    }

    /// Selection of every path in `index`, read from the output directory.
    pub fn selection_state(&self, index: &TextureIndex) -> MixResult<SelectionMap> {
        selection::resolve_selection(index, self.output_dir())
    }

    /// Selection of every path in the current index.
    pub fn selection(&self) -> MixResult<SelectionMap> {
        let index = self.index()?;
        self.selection_state(&index)
    }

    /// Current selection of one path.
    pub fn path_state(&self, rel_path: &str) -> MixResult<SelectionState> {
        let index = self.index()?;
        if !index.contains(rel_path) {
            return Err(MixError::UnknownAsset(rel_path.to_string()));
        }
        selection::resolve_path(self.output_dir(), rel_path, index.candidates(rel_path))
    }

    /// Catalog of the index joined with the current selection.
    pub fn catalog(&self, filter: &CatalogFilter) -> MixResult<Catalog> {
        let index = self.index()?;
        let selection = self.selection_state(&index)?;
        Ok(Catalog::build(&index, &selection, filter))
    }

    /// Select the candidate from `pack_name` for `rel_path`.
    pub fn apply_selection(&self, rel_path: &str, pack_name: &str) -> MixResult<SelectOutcome> {
        let index = self.index()?;
        if !index.contains(rel_path) {
            return Err(MixError::UnknownAsset(rel_path.to_string()));
        }
        let candidate =
            index
                .candidate(rel_path, pack_name)
                .ok_or_else(|| MixError::UnknownCandidate {
                    rel_path: rel_path.to_string(),
                    pack: pack_name.to_string(),
                })?;

        selection::select(self.output_dir(), rel_path, candidate)
    }

    /// Clear the selection for `rel_path`.
    ///
    /// Only indexed paths can be cleared, so unrelated files in the output
    /// directory are never removed.
    pub fn clear_selection(&self, rel_path: &str) -> MixResult<bool> {
        let index = self.index()?;
        if !index.contains(rel_path) {
            return Err(MixError::UnknownAsset(rel_path.to_string()));
        }
        selection::deselect(self.output_dir(), rel_path)
    }

    /// Output file location for `rel_path`.
    pub fn output_path(&self, rel_path: &str) -> MixResult<PathBuf> {
        selection::output_path(self.output_dir(), rel_path)
    }
}

/// Handle to an index build running on the blocking pool.
pub struct BackgroundBuild {
    cancellation: CancellationToken,
    handle: JoinHandle<MixResult<IndexLoad>>,
}

impl BackgroundBuild {
    /// Request cancellation; [`BackgroundBuild::wait`] then returns
    /// [`MixError::Cancelled`] unless the build already finished.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the build to finish.
    pub async fn wait(self) -> MixResult<IndexLoad> {
        self.handle
            .await
            .map_err(|e| MixError::TaskFailed(e.to_string()))?
    }
}
