//! Resource pack discovery and scanning.
//!
//! # Layout
//!
//! ```text
//! mix_dir/
//! ├── Faithful/              # Pack "Faithful"
//! │   └── assets/minecraft/textures/block/stone.png
//! ├── Vanilla Tweaks/        # Pack "Vanilla Tweaks"
//! │   └── assets/minecraft/textures/block/stone.png
//! └── mix_map.bin            # Index cache (files are not packs)
//! ```
//!
//! [`PackDiscovery`] lists the packs of a mix directory in name order and
//! [`PackScanner`] walks a single pack for texture assets.

mod discovery;
mod scanner;

pub use discovery::{PackDiscovery, PackSource};
pub use scanner::{PackScan, PackScanner, ScannedTexture};
