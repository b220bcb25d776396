//! Recover the current selection from the output directory.
//!
//! For every indexed path the output file (if any) is compared byte for byte
//! against each candidate in index order; the first exact match is the
//! selection. Timestamps and other metadata are never consulted.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use rayon::prelude::*;
use tracing::warn;

use crate::classify::join_relative;
use crate::error::{MixError, MixResult};
use crate::index::{Candidate, TextureIndex};

use super::{SelectionMap, SelectionState};

const COMPARE_CHUNK: usize = 64 * 1024;

/// Resolve the selection state of every path in `index`.
///
/// A pure function of the index and the output directory contents: calling
/// it twice on unchanged inputs returns equal maps. Paths are resolved in
/// parallel. Every indexed path gets an entry; a slot that cannot be
/// inspected is logged and reported as [`SelectionState::Untracked`] rather
/// than failing the whole map.
pub fn resolve_selection(index: &TextureIndex, output_dir: &Path) -> MixResult<SelectionMap> {
    let entries: Vec<_> = index.entries().collect();

    let map = entries
        .par_iter()
        .map(|(rel_path, candidates)| {
            let state = resolve_path(output_dir, rel_path, candidates).unwrap_or_else(|e| {
                warn!(rel_path = %rel_path, error = %e, "Output slot unreadable");
                SelectionState::Untracked
            });
            ((*rel_path).clone(), state)
        })
        .collect();

    Ok(map)
}

/// Resolve the selection state of a single path.
pub fn resolve_path(
    output_dir: &Path,
    rel_path: &str,
    candidates: &[Candidate],
) -> MixResult<SelectionState> {
    let output_path = join_relative(output_dir, rel_path)?;

    let metadata = match std::fs::metadata(&output_path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SelectionState::Absent),
        // A file stands where a parent directory should be
        Err(e) if e.kind() == io::ErrorKind::NotADirectory => return Ok(SelectionState::Absent),
        Err(e) => {
            return Err(MixError::ReadFailed {
                path: output_path,
                source: e,
            })
        }
    };

    if !metadata.is_file() {
        return Ok(SelectionState::Untracked);
    }

    let output = std::fs::read(&output_path).map_err(|e| MixError::ReadFailed {
        path: output_path.clone(),
        source: e,
    })?;

    for candidate in candidates {
        match content_matches(&candidate.path, &output) {
            Ok(true) => return Ok(SelectionState::Selected(candidate.clone())),
            Ok(false) => {}
            Err(e) => {
                // Stale candidates simply cannot match
                warn!(
                    pack = %candidate.pack_name,
                    path = %candidate.path.display(),
                    error = %e,
                    "Candidate unreadable during selection resolve"
                );
            }
        }
    }

    Ok(SelectionState::Untracked)
}

/// Compare a file's full content with `expected`.
fn content_matches(path: &Path, expected: &[u8]) -> io::Result<bool> {
    let mut file = File::open(path)?;

    if file.metadata()?.len() != expected.len() as u64 {
        return Ok(false);
    }

    let mut buf = vec![0u8; COMPARE_CHUNK];
    let mut offset = 0;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            return Ok(offset == expected.len());
        }
        let end = offset + n;
        if end > expected.len() || buf[..n] != expected[offset..end] {
            return Ok(false);
        }
        offset = end;
    }
}
