//! Pack folder discovery.
//!
//! Every immediate subdirectory of the mix directory is one pack, named after
//! the folder. Plain files (including the index cache) are ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MixError, MixResult};

/// A single resource pack inside the mix directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSource {
    /// Pack name (folder name).
    pub name: String,

    /// Real filesystem path to the pack folder.
    pub path: PathBuf,
}

impl PackSource {
    /// Create a new pack source.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Get the pack root path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for PackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Discovers resource packs in a mix directory.
#[derive(Debug, Clone)]
pub struct PackDiscovery {
    /// Root mix directory.
    mix_dir: PathBuf,
}

impl PackDiscovery {
    /// Create a new pack discovery for the given directory.
    pub fn new(mix_dir: impl Into<PathBuf>) -> Self {
        Self {
            mix_dir: mix_dir.into(),
        }
    }

    /// Get the mix directory.
    pub fn mix_dir(&self) -> &Path {
        &self.mix_dir
    }

    /// Check if the mix directory exists.
    pub fn exists(&self) -> bool {
        self.mix_dir.is_dir()
    }

    /// Find all packs in the mix directory.
    ///
    /// Returns packs sorted by name (byte order), which is the candidate
    /// order used by the index. A missing mix directory yields no packs.
    pub fn find_packs(&self) -> MixResult<Vec<PackSource>> {
        if !self.exists() {
            debug!(path = %self.mix_dir.display(), "Mix directory not found, no packs");
            return Ok(Vec::new());
        }

        let read_failed = |source| MixError::ReadFailed {
            path: self.mix_dir.clone(),
            source,
        };

        let mut packs = Vec::new();
        for entry in std::fs::read_dir(&self.mix_dir).map_err(read_failed)? {
            let entry = entry.map_err(read_failed)?;
            let path = entry.path();

            // Follows symlinks so linked packs are accepted
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            packs.push(PackSource::new(name, path));
        }

        packs.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            path = %self.mix_dir.display(),
            count = packs.len(),
            "Discovered packs"
        );

        Ok(packs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_mix_dir_has_no_packs() {
        let temp = TempDir::new().unwrap();
        let discovery = PackDiscovery::new(temp.path().join("nope"));

        assert!(!discovery.exists());
        assert!(discovery.find_packs().unwrap().is_empty());
    }

    #[test]
    fn test_packs_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        for name in ["Zeta", "Alpha", "mid", "Beta"] {
            std::fs::create_dir(temp.path().join(name)).unwrap();
        }

        let packs = PackDiscovery::new(temp.path()).find_packs().unwrap();
        let names: Vec<_> = packs.iter().map(|p| p.name.as_str()).collect();

        // Byte order: uppercase before lowercase
        assert_eq!(names, vec!["Alpha", "Beta", "Zeta", "mid"]);
    }

    #[test]
    fn test_files_are_not_packs() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Pack")).unwrap();
        std::fs::write(temp.path().join("mix_map.bin"), b"cache").unwrap();
        std::fs::write(temp.path().join("readme.txt"), b"hello").unwrap();

        let packs = PackDiscovery::new(temp.path()).find_packs().unwrap();

        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].name, "Pack");
        assert_eq!(packs[0].path(), temp.path().join("Pack"));
    }

    #[test]
    fn test_pack_source_display() {
        let pack = PackSource::new("Faithful", "/mix/Faithful");
        assert_eq!(format!("{}", pack), "Faithful (/mix/Faithful)");
    }
}
