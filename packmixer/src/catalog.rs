//! Browsable view of the index joined with the current selection.
//!
//! A [`Catalog`] is a sorted list of rows, one per indexed texture path,
//! suitable for listing in a terminal or a picker. Rows can be filtered to
//! the paths that have no output yet, or to those matching a search term.

use crate::index::TextureIndex;
use crate::selection::{SelectionMap, SelectionState};

/// Short label for a texture path.
///
/// Every `assets/minecraft/` and every `textures/` segment is dropped.
///
/// ```
/// use packmixer::catalog::display_name;
///
/// assert_eq!(display_name("assets/minecraft/textures/block/stone.png"), "block/stone.png");
/// assert_eq!(display_name("assets/mymod/textures/item/gem.png"), "assets/mymod/item/gem.png");
/// ```
pub fn display_name(rel_path: &str) -> String {
    rel_path
        .replace("assets/minecraft/", "")
        .replace("textures/", "")
}

/// One texture path with its candidates and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub rel_path: String,
    pub display_name: String,
    /// Pack names providing this path, in index order.
    pub candidates: Vec<String>,
    pub state: SelectionState,
}

/// Row filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Hide rows whose output slot is occupied.
    pub unselected_only: bool,
    /// Keep rows whose path contains this term (case-insensitive).
    pub search: Option<String>,
}

impl CatalogFilter {
    fn accepts(&self, rel_path: &str, state: &SelectionState) -> bool {
        if self.unselected_only && state.has_output() {
            return false;
        }
        match &self.search {
            Some(term) if !term.is_empty() => {
                rel_path.to_lowercase().contains(&term.to_lowercase())
            }
            _ => true,
        }
    }
}

/// Counts over a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub assets: usize,
    pub selected: usize,
    pub untracked: usize,
    pub absent: usize,
}

/// Sorted rows of a texture index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    /// Join `index` with `selection` and apply `filter`.
    ///
    /// Paths missing from `selection` are treated as absent.
    pub fn build(index: &TextureIndex, selection: &SelectionMap, filter: &CatalogFilter) -> Self {
        let rows = index
            .entries()
            .filter_map(|(rel_path, candidates)| {
                let state = selection
                    .get(rel_path)
                    .cloned()
                    .unwrap_or(SelectionState::Absent);
                if !filter.accepts(rel_path, &state) {
                    return None;
                }
                Some(CatalogRow {
                    rel_path: rel_path.clone(),
                    display_name: display_name(rel_path),
                    candidates: candidates.iter().map(|c| c.pack_name.clone()).collect(),
                    state,
                })
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by relative path.
    pub fn row(&self, rel_path: &str) -> Option<&CatalogRow> {
        self.rows
            .binary_search_by(|r| r.rel_path.as_str().cmp(rel_path))
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut summary = CatalogSummary {
            assets: self.rows.len(),
            ..CatalogSummary::default()
        };
        for row in &self.rows {
            match row.state {
                SelectionState::Selected(_) => summary.selected += 1,
                SelectionState::Untracked => summary.untracked += 1,
                SelectionState::Absent => summary.absent += 1,
            }
        }
        summary
    }

    /// Start a search over the rows.
    pub fn search(&self, term: &str) -> SearchCursor {
        SearchCursor::new(self, term)
    }
}

/// Position within the rows matching a search term.
///
/// `next` and `prev` wrap around at either end.
#[derive(Debug, Clone)]
pub struct SearchCursor {
    matches: Vec<usize>,
    position: Option<usize>,
}

impl SearchCursor {
    /// Find rows whose path contains `term`, ignoring case.
    ///
    /// The cursor starts before the first match.
    pub fn new(catalog: &Catalog, term: &str) -> Self {
        let needle = term.to_lowercase();
        let matches = if needle.is_empty() {
            Vec::new()
        } else {
            catalog
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row.rel_path.to_lowercase().contains(&needle))
                .map(|(i, _)| i)
                .collect()
        };

        Self {
            matches,
            position: None,
        }
    }

    /// Number of matching rows.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Row index of the current match.
    pub fn current(&self) -> Option<usize> {
        self.position.map(|p| self.matches[p])
    }

    /// Advance to the next match, wrapping to the first.
    pub fn next(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let next = match self.position {
            Some(p) => (p + 1) % self.matches.len(),
            None => 0,
        };
        self.position = Some(next);
        self.current()
    }

    /// Step back to the previous match, wrapping to the last.
    pub fn prev(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let prev = match self.position {
            Some(0) | None => self.matches.len() - 1,
            Some(p) => p - 1,
        };
        self.position = Some(prev);
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Candidate;

    const STONE: &str = "assets/minecraft/textures/block/stone.png";
    const DIRT: &str = "assets/minecraft/textures/block/dirt.png";
    const APPLE: &str = "assets/minecraft/textures/item/apple.png";

    fn index() -> TextureIndex {
        let mut index = TextureIndex::new();
        index.add_pack("A");
        index.insert(STONE, Candidate::new("A", "/mix/A/stone.png"));
        index.insert(APPLE, Candidate::new("A", "/mix/A/apple.png"));
        index.add_pack("B");
        index.insert(STONE, Candidate::new("B", "/mix/B/stone.png"));
        index.insert(DIRT, Candidate::new("B", "/mix/B/dirt.png"));
        index
    }

    fn selection() -> SelectionMap {
        let mut map = SelectionMap::new();
        map.insert(
            STONE.to_string(),
            SelectionState::Selected(Candidate::new("B", "/mix/B/stone.png")),
        );
        map.insert(DIRT.to_string(), SelectionState::Untracked);
        map.insert(APPLE.to_string(), SelectionState::Absent);
        map
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(STONE), "block/stone.png");
        assert_eq!(display_name("assets/x/textures/a.png"), "assets/x/a.png");
        assert_eq!(display_name("plain.png"), "plain.png");
        assert_eq!(
            display_name("assets/minecraft/textures/gui/textures/icons.png"),
            "gui/icons.png"
        );
    }

    #[test]
    fn test_build_sorted_with_candidates() {
        let catalog = Catalog::build(&index(), &selection(), &CatalogFilter::default());

        let paths: Vec<_> = catalog.rows().iter().map(|r| r.rel_path.as_str()).collect();
        assert_eq!(paths, vec![DIRT, STONE, APPLE]);

        let stone = catalog.row(STONE).unwrap();
        assert_eq!(stone.candidates, vec!["A", "B"]);
        assert_eq!(stone.display_name, "block/stone.png");
        assert!(stone.state.is_selected());
    }

    #[test]
    fn test_unselected_only_hides_occupied_slots() {
        let filter = CatalogFilter {
            unselected_only: true,
            search: None,
        };
        let catalog = Catalog::build(&index(), &selection(), &filter);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.rows()[0].rel_path, APPLE);
    }

    #[test]
    fn test_search_filter_ignores_case() {
        let filter = CatalogFilter {
            unselected_only: false,
            search: Some("BLOCK/".to_string()),
        };
        let catalog = Catalog::build(&index(), &selection(), &filter);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_missing_selection_entry_is_absent() {
        let catalog = Catalog::build(&index(), &SelectionMap::new(), &CatalogFilter::default());
        assert!(catalog
            .rows()
            .iter()
            .all(|r| r.state == SelectionState::Absent));
    }

    #[test]
    fn test_summary() {
        let catalog = Catalog::build(&index(), &selection(), &CatalogFilter::default());
        assert_eq!(
            catalog.summary(),
            CatalogSummary {
                assets: 3,
                selected: 1,
                untracked: 1,
                absent: 1,
            }
        );
    }

    #[test]
    fn test_search_cursor_wraps() {
        let catalog = Catalog::build(&index(), &selection(), &CatalogFilter::default());
        let mut cursor = catalog.search("Block");

        assert_eq!(cursor.match_count(), 2);
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), Some(1));
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.prev(), Some(1));
        assert_eq!(cursor.prev(), Some(0));
        assert_eq!(cursor.current(), Some(0));
    }

    #[test]
    fn test_search_cursor_prev_from_start() {
        let catalog = Catalog::build(&index(), &selection(), &CatalogFilter::default());
        let mut cursor = catalog.search("png");
        assert_eq!(cursor.prev(), Some(2));
    }

    #[test]
    fn test_search_cursor_no_matches() {
        let catalog = Catalog::build(&index(), &selection(), &CatalogFilter::default());
        let mut cursor = catalog.search("lava");
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.prev(), None);

        let mut empty = catalog.search("");
        assert_eq!(empty.next(), None);
    }
}
