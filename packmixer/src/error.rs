//! Error types for the mixing engine.
//!
//! Fatal failures are returned as [`MixError`]. Conditions the engine
//! tolerates (unreadable subtrees, a corrupt cache, ...) are collected as
//! [`IndexWarning`] values and handed back next to the result.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type MixResult<T> = Result<T, MixError>;

/// Errors that can occur while indexing packs or applying selections.
#[derive(Debug, Error)]
pub enum MixError {
    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// The candidate file no longer exists in its pack.
    ///
    /// The index was built (or cached) before the pack tree changed.
    #[error("source texture missing for pack '{pack}': {}", .path.display())]
    SourceMissing { pack: String, path: PathBuf },

    /// Copying a candidate into the output directory failed.
    #[error("failed to copy texture to {}: {source}", .path.display())]
    CopyFailed { path: PathBuf, source: io::Error },

    /// Removing a materialized texture failed.
    #[error("failed to remove {}: {source}", .path.display())]
    RemoveFailed { path: PathBuf, source: io::Error },

    /// The cache artifact could not be read.
    #[error("failed to read index cache {}: {reason}", .path.display())]
    CacheRead { path: PathBuf, reason: String },

    /// The cache artifact could not be written.
    #[error("failed to write index cache {}: {reason}", .path.display())]
    CacheWrite { path: PathBuf, reason: String },

    /// A relative path that would escape the output directory.
    #[error("invalid relative path: '{0}'")]
    InvalidRelativePath(String),

    /// The relative path is not in the index.
    #[error("unknown texture path: {0}")]
    UnknownAsset(String),

    /// No pack with this name provides the relative path.
    #[error("pack '{pack}' does not provide {rel_path}")]
    UnknownCandidate { rel_path: String, pack: String },

    /// The build was cancelled before it finished.
    #[error("index build cancelled")]
    Cancelled,

    /// A background task panicked or was aborted.
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// Non-fatal conditions reported alongside an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexWarning {
    /// A file or directory inside a pack could not be read and was skipped.
    UnreadableEntry { path: PathBuf, reason: String },

    /// A file name is not valid UTF-8 and cannot be used as an index key.
    NonUtf8Path { path: PathBuf },

    /// The cache artifact existed but could not be decoded; a full scan ran.
    CacheCorrupt { path: PathBuf, reason: String },

    /// A stale cache artifact could not be deleted after a failed save.
    CacheInvalidateFailed { path: PathBuf, reason: String },

    /// The freshly built index could not be persisted.
    CacheWriteFailed { path: PathBuf, reason: String },
}

impl fmt::Display for IndexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableEntry { path, reason } => {
                write!(f, "skipped unreadable {}: {}", path.display(), reason)
            }
            Self::NonUtf8Path { path } => {
                write!(f, "skipped non UTF-8 path {}", path.display())
            }
            Self::CacheCorrupt { path, reason } => {
                write!(f, "ignored corrupt cache {}: {}", path.display(), reason)
            }
            Self::CacheInvalidateFailed { path, reason } => {
                write!(f, "could not delete cache {}: {}", path.display(), reason)
            }
            Self::CacheWriteFailed { path, reason } => {
                write!(f, "could not save cache {}: {}", path.display(), reason)
            }
        }
    }
}
