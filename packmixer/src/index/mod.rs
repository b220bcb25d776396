//! Texture index: which packs provide which texture paths.
//!
//! # Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              IndexBuilder               │
//! │                                         │
//! │  PackDiscovery(mix_dir) → [A, B, C]     │
//! │  PackScanner per pack (rayon optional)  │
//! │  merge in pack name order               │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │              TextureIndex               │
//! │                                         │
//! │  "assets/.../stone.png" → [A, B]        │
//! │  "assets/.../apple.png" → [A]           │
//! └────────────────┬────────────────────────┘
//!                  │ write-through
//!                  ▼
//!        IndexCache (mix_dir/mix_map.bin)
//! ```

mod builder;
mod cache;
mod texture_index;

pub use builder::{build_index, merge_scans, IndexBuildReport, IndexBuilder};
pub use cache::{CachedIndex, IndexCache, IndexLoad, IndexSource, DEFAULT_CACHE_FILE};
pub use texture_index::{Candidate, TextureIndex};
