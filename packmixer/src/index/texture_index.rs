//! Index mapping texture paths to the packs that provide them.
//!
//! Unlike an overlay where the first source wins, every provider is kept:
//! each relative path maps to the full, ordered list of candidates so the
//! operator can pick one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One pack's variant of a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Name of the pack providing this variant.
    pub pack_name: String,

    /// Real filesystem path to the file inside the pack.
    pub path: PathBuf,
}

impl Candidate {
    /// Create a new candidate.
    pub fn new(pack_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            pack_name: pack_name.into(),
            path: path.into(),
        }
    }

    /// Get the source file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Merged index of all textures across the packs of a mix directory.
///
/// Keys are forward-slash relative paths (e.g.
/// `assets/minecraft/textures/block/stone.png`). Candidates appear in pack
/// order, which is the sorted order of pack names, so two scans of the same
/// mix directory produce equal indexes.
///
/// # Example
///
/// ```
/// use packmixer::{Candidate, TextureIndex};
///
/// let mut index = TextureIndex::new();
/// index.add_pack("A");
/// index.insert("assets/m/textures/a.png", Candidate::new("A", "/mix/A/assets/m/textures/a.png"));
/// index.add_pack("B");
/// index.insert("assets/m/textures/a.png", Candidate::new("B", "/mix/B/assets/m/textures/a.png"));
///
/// let packs: Vec<_> = index
///     .candidates("assets/m/textures/a.png")
///     .iter()
///     .map(|c| c.pack_name.as_str())
///     .collect();
/// assert_eq!(packs, ["A", "B"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureIndex {
    /// Map from relative path to its candidates, in pack order.
    entries: BTreeMap<String, Vec<Candidate>>,

    /// Names of the packs included in this index, in scan order.
    pack_names: Vec<String>,
}

impl TextureIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pack as part of this index.
    pub fn add_pack(&mut self, name: impl Into<String>) {
        self.pack_names.push(name.into());
    }

    /// Append a candidate for a relative path.
    ///
    /// Candidates are kept in insertion order; callers insert packs in
    /// name order.
    pub fn insert(&mut self, rel_path: impl Into<String>, candidate: Candidate) {
        self.entries
            .entry(rel_path.into())
            .or_default()
            .push(candidate);
    }

    /// Get the candidates for a relative path.
    ///
    /// Returns an empty slice for unknown paths.
    pub fn candidates(&self, rel_path: &str) -> &[Candidate] {
        self.entries
            .get(rel_path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find the candidate a given pack provides for a relative path.
    pub fn candidate(&self, rel_path: &str, pack_name: &str) -> Option<&Candidate> {
        self.candidates(rel_path)
            .iter()
            .find(|c| c.pack_name == pack_name)
    }

    /// Check if a relative path is in the index.
    pub fn contains(&self, rel_path: &str) -> bool {
        self.entries.contains_key(rel_path)
    }

    /// Iterate over all entries in relative path order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Vec<Candidate>)> {
        self.entries.iter()
    }

    /// Iterate over relative paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Get the names of packs included in this index, in scan order.
    pub fn pack_names(&self) -> &[String] {
        &self.pack_names
    }

    /// Number of packs scanned.
    pub fn pack_count(&self) -> usize {
        self.pack_names.len()
    }

    /// Number of distinct relative paths.
    pub fn path_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of candidates across all paths.
    pub fn candidate_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Number of paths offered by more than one pack.
    pub fn conflict_count(&self) -> usize {
        self.entries.values().filter(|c| c.len() > 1).count()
    }

    /// Check if the index has no textures.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STONE: &str = "assets/minecraft/textures/block/stone.png";
    const DIRT: &str = "assets/minecraft/textures/block/dirt.png";

    fn sample_index() -> TextureIndex {
        let mut index = TextureIndex::new();
        index.add_pack("A");
        index.insert(STONE, Candidate::new("A", "/mix/A/stone.png"));
        index.add_pack("B");
        index.insert(STONE, Candidate::new("B", "/mix/B/stone.png"));
        index.insert(DIRT, Candidate::new("B", "/mix/B/dirt.png"));
        index
    }

    #[test]
    fn test_empty_index() {
        let index = TextureIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.path_count(), 0);
        assert_eq!(index.pack_count(), 0);
        assert!(index.candidates(STONE).is_empty());
    }

    #[test]
    fn test_candidates_keep_insertion_order() {
        let index = sample_index();
        let packs: Vec<_> = index
            .candidates(STONE)
            .iter()
            .map(|c| c.pack_name.as_str())
            .collect();
        assert_eq!(packs, vec!["A", "B"]);
    }

    #[test]
    fn test_counts() {
        let index = sample_index();
        assert_eq!(index.pack_count(), 2);
        assert_eq!(index.path_count(), 2);
        assert_eq!(index.candidate_count(), 3);
        assert_eq!(index.conflict_count(), 1);
    }

    #[test]
    fn test_candidate_lookup_by_pack() {
        let index = sample_index();
        let b = index.candidate(STONE, "B").unwrap();
        assert_eq!(b.path(), Path::new("/mix/B/stone.png"));
        assert!(index.candidate(DIRT, "A").is_none());
        assert!(index.candidate("missing.png", "A").is_none());
    }

    #[test]
    fn test_paths_are_sorted() {
        let index = sample_index();
        let paths: Vec<_> = index.paths().cloned().collect();
        assert_eq!(paths, vec![DIRT.to_string(), STONE.to_string()]);
        assert!(index.contains(DIRT));
    }
}
