//! Packmixer - layered texture resolution for resource packs
//!
//! This library indexes a directory of resource packs, discovers which packs
//! provide a variant of every texture path, and materializes exactly one
//! chosen variant per path into a flat output directory read by the game
//! client.
//!
//! # Architecture
//!
//! ```text
//! mix_dir/<pack>/assets/**/textures/**/*.png
//!        │
//!        ▼
//! PackScanner ──► IndexBuilder ──► IndexCache (mix_dir/mix_map.bin)
//!                                      │
//!                                      ▼
//!                               TextureIndex ──► resolve_selection(output_dir)
//!                                      │
//!                                      ▼
//!                               select / deselect ──► output_dir/<rel_path>
//! ```
//!
//! The current selection is never stored on its own: it is recomputed by
//! comparing the bytes of each output file against the candidates.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod mixer;
pub mod pack;
pub mod selection;

pub use error::{IndexWarning, MixError, MixResult};
pub use index::{Candidate, IndexLoad, IndexSource, TextureIndex};
pub use mixer::{BackgroundBuild, BuildMode, Mixer, MixerConfig};
pub use selection::{SelectionMap, SelectionState};

/// Crate version, recorded in the index cache header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
