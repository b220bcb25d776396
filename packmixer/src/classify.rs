//! Texture path classification and relative path handling.
//!
//! A file inside a pack is a texture asset when it is a `.png` (any case)
//! somewhere below both an `assets` and a `textures` directory, e.g.
//! `assets/minecraft/textures/block/stone.png`. The two directories may
//! appear in any order and need not be adjacent.

use std::path::{Component, Path, PathBuf};

use crate::error::{MixError, MixResult};

/// Texture file extension, compared case-insensitively.
pub const TEXTURE_EXTENSION: &str = "png";

/// Directory name that must appear among the parent components.
pub const ASSETS_DIR: &str = "assets";

/// Directory name that must appear among the parent components.
pub const TEXTURES_DIR: &str = "textures";

/// Check whether a path (relative to its pack root) is a texture asset.
///
/// Only the directory components are searched for `assets` and `textures`;
/// the file name itself never counts. A `.png` outside such a subtree is
/// simply not a texture, which is not an error.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use packmixer::classify::is_texture_asset;
///
/// assert!(is_texture_asset(Path::new("assets/minecraft/textures/block/stone.png")));
/// assert!(is_texture_asset(Path::new("textures/x/assets/y.PNG")));
/// assert!(!is_texture_asset(Path::new("assets/minecraft/models/stone.png")));
/// assert!(!is_texture_asset(Path::new("assets/minecraft/textures/stone.json")));
/// ```
pub fn is_texture_asset(path: &Path) -> bool {
    let has_png_extension = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| has_extension_ignore_case(n, TEXTURE_EXTENSION))
        .unwrap_or(false);

    if !has_png_extension {
        return false;
    }

    let Some(parent) = path.parent() else {
        return false;
    };

    let mut has_assets = false;
    let mut has_textures = false;
    for component in parent.components() {
        if let Component::Normal(name) = component {
            if name == ASSETS_DIR {
                has_assets = true;
            } else if name == TEXTURES_DIR {
                has_textures = true;
            }
        }
    }

    has_assets && has_textures
}

fn has_extension_ignore_case(file_name: &str, extension: &str) -> bool {
    let suffix_len = extension.len() + 1;
    if file_name.len() < suffix_len || !file_name.is_char_boundary(file_name.len() - suffix_len)
    {
        return false;
    }
    let suffix = &file_name[file_name.len() - suffix_len..];
    suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(extension)
}

/// Turn a path relative to a pack root into an index key.
///
/// Components are joined with `/` regardless of platform. Returns `None`
/// when a component is not valid UTF-8.
pub fn normalize_relative(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Convert an index key back into a path below `root`.
///
/// Rejects keys that are empty, absolute, or contain `..`, so a key can never
/// address anything outside `root`. Backslashes are accepted as separators.
/// On Windows a `:` is rejected as well, since it would name a drive or an
/// alternate data stream; elsewhere it is an ordinary file name character.
pub fn join_relative(root: &Path, rel_path: &str) -> MixResult<PathBuf> {
    let invalid = || MixError::InvalidRelativePath(rel_path.to_string());

    let mut joined = root.to_path_buf();
    let mut segments = 0;
    for segment in rel_path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid()),
            s if cfg!(windows) && s.contains(':') => return Err(invalid()),
            s => {
                joined.push(s);
                segments += 1;
            }
        }
    }

    if segments == 0 || rel_path.starts_with('/') || rel_path.starts_with('\\') {
        return Err(invalid());
    }

    Ok(joined)
}
