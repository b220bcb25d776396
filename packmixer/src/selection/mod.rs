//! Selection of one candidate per texture path.
//!
//! The output directory is the only record of what is selected. The
//! [`resolve_selection`] function recomputes the selection by comparing file
//! contents, and [`select`]/[`deselect`] change it by writing or removing the
//! single file slot at `output_dir/<rel_path>`. Because one path holds one
//! file, at most one candidate can ever be selected per texture.

mod applier;
mod resolver;

use std::collections::BTreeMap;

use crate::index::Candidate;

pub use applier::{deselect, output_path, select, SelectOutcome};
pub use resolver::{resolve_path, resolve_selection};

/// Selection state of a single texture path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// No file exists in the output directory.
    Absent,

    /// The output file matches this candidate byte for byte.
    Selected(Candidate),

    /// An output file exists but matches none of the candidates.
    ///
    /// Something outside the engine wrote it. It counts as "nothing
    /// selected" for exclusivity purposes.
    Untracked,
}

impl SelectionState {
    /// Get the selected candidate, if any.
    pub fn selected(&self) -> Option<&Candidate> {
        match self {
            SelectionState::Selected(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Check if a candidate is selected.
    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionState::Selected(_))
    }

    /// Check if any file occupies the output slot.
    pub fn has_output(&self) -> bool {
        !matches!(self, SelectionState::Absent)
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionState::Absent => write!(f, "none"),
            SelectionState::Selected(candidate) => write!(f, "{}", candidate.pack_name),
            SelectionState::Untracked => write!(f, "untracked"),
        }
    }
}

/// Selection state for every path of an index, in path order.
pub type SelectionMap = BTreeMap<String, SelectionState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_state_helpers() {
        let candidate = Candidate::new("A", "/mix/A/stone.png");
        let selected = SelectionState::Selected(candidate.clone());

        assert_eq!(selected.selected(), Some(&candidate));
        assert!(selected.is_selected());
        assert!(selected.has_output());

        assert!(!SelectionState::Untracked.is_selected());
        assert!(SelectionState::Untracked.has_output());
        assert!(!SelectionState::Absent.has_output());
        assert_eq!(SelectionState::Absent.selected(), None);
    }

    #[test]
    fn test_selection_state_display() {
        let selected = SelectionState::Selected(Candidate::new("Faithful", "/x.png"));
        assert_eq!(selected.to_string(), "Faithful");
        assert_eq!(SelectionState::Absent.to_string(), "none");
        assert_eq!(SelectionState::Untracked.to_string(), "untracked");
    }
}
