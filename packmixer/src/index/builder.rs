//! Builds a [`TextureIndex`] from a mix directory.
//!
//! Packs are independent, so with `parallel` enabled they are scanned on the
//! rayon pool. Results are merged in pack name order afterwards, never in
//! completion order, which keeps candidate ordering identical to a
//! sequential scan.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{IndexWarning, MixError, MixResult};
use crate::pack::{PackDiscovery, PackScan, PackScanner, PackSource};

use super::texture_index::{Candidate, TextureIndex};

/// A built index together with the entries that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct IndexBuildReport {
    /// The merged index.
    pub index: TextureIndex,

    /// Non-fatal problems met during the scan.
    pub warnings: Vec<IndexWarning>,
}

/// Builder that scans every pack of a mix directory.
///
/// # Example
///
/// ```no_run
/// use packmixer::index::IndexBuilder;
///
/// let report = IndexBuilder::new("/games/mc/MixDir").parallel(true).build()?;
/// println!("{} textures", report.index.path_count());
/// # Ok::<(), packmixer::MixError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    mix_dir: PathBuf,
    parallel: bool,
    cancellation: CancellationToken,
}

impl IndexBuilder {
    /// Create a builder for the given mix directory.
    pub fn new(mix_dir: impl Into<PathBuf>) -> Self {
        Self {
            mix_dir: mix_dir.into(),
            parallel: false,
            cancellation: CancellationToken::new(),
        }
    }

    /// Scan packs concurrently.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Abort the build when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Get the mix directory.
    pub fn mix_dir(&self) -> &Path {
        &self.mix_dir
    }

    /// Scan all packs and merge them into an index.
    ///
    /// A missing mix directory yields an empty index. The build is
    /// all-or-nothing: cancellation returns [`MixError::Cancelled`] and no
    /// partial index.
    pub fn build(&self) -> MixResult<IndexBuildReport> {
        let start = Instant::now();
        let packs = PackDiscovery::new(&self.mix_dir).find_packs()?;
        let scanner = PackScanner::new().with_cancellation(self.cancellation.clone());

        let scan_pack = |pack: &PackSource| -> MixResult<(PackSource, PackScan)> {
            if self.cancellation.is_cancelled() {
                return Err(MixError::Cancelled);
            }
            Ok((pack.clone(), scanner.scan(&pack.path)?))
        };

        let mut scans: Vec<(PackSource, PackScan)> = if self.parallel {
            packs.par_iter().map(scan_pack).collect::<MixResult<_>>()?
        } else {
            packs.iter().map(scan_pack).collect::<MixResult<_>>()?
        };

        if self.cancellation.is_cancelled() {
            return Err(MixError::Cancelled);
        }

        scans.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));
        let report = merge_scans(scans);

        if !report.warnings.is_empty() {
            warn!(
                count = report.warnings.len(),
                "Some pack entries could not be read and were skipped"
            );
        }

        info!(
            mix_dir = %self.mix_dir.display(),
            packs = report.index.pack_count(),
            textures = report.index.path_count(),
            candidates = report.index.candidate_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built texture index"
        );

        Ok(report)
    }
}

/// Merge per-pack scans into one index, in the given pack order.
pub fn merge_scans(scans: impl IntoIterator<Item = (PackSource, PackScan)>) -> IndexBuildReport {
    let mut report = IndexBuildReport::default();

    for (pack, scan) in scans {
        report.index.add_pack(&pack.name);
        for texture in scan.textures {
            report
                .index
                .insert(texture.rel_path, Candidate::new(&pack.name, texture.path));
        }
        report.warnings.extend(scan.warnings);
    }

    report
}

/// Build an index of `mix_dir` sequentially, discarding warnings.
pub fn build_index(mix_dir: &Path) -> MixResult<TextureIndex> {
    IndexBuilder::new(mix_dir).build().map(|r| r.index)
}
