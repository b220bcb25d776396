//! Materialize a selection into the output directory.
//!
//! `select` copies the candidate into a temporary file next to the target
//! and renames it into place, so a failed copy never leaves a truncated
//! texture behind. Permissions and timestamps are carried over.

use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tracing::{debug, info};

use crate::classify::join_relative;
use crate::error::{MixError, MixResult};
use crate::index::Candidate;

/// Prefix of in-flight copies inside the output directory.
const PARTIAL_PREFIX: &str = ".packmixer-";

/// Outcome of a [`select`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The candidate was copied into the output slot.
    Written,
    /// The output slot already held identical content; nothing was written.
    Unchanged,
}

/// Make `candidate` the selection for `rel_path`.
///
/// Overwrites whatever occupied the slot before. Selecting the same
/// candidate twice leaves the output untouched the second time.
///
/// # Errors
///
/// - [`MixError::SourceMissing`] if the candidate file is gone from its pack
/// - [`MixError::CopyFailed`] on any I/O error while writing; the previous
///   output file (if any) is left as it was
pub fn select(output_dir: &Path, rel_path: &str, candidate: &Candidate) -> MixResult<SelectOutcome> {
    let dest = join_relative(output_dir, rel_path)?;
    let source_meta = source_metadata(candidate)?;

    if already_materialized(&dest, candidate, &source_meta) {
        debug!(rel_path, pack = %candidate.pack_name, "Selection already applied");
        return Ok(SelectOutcome::Unchanged);
    }

    let parent = dest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_dir.to_path_buf());
    fs::create_dir_all(&parent).map_err(|e| MixError::CreateDirFailed {
        path: parent.clone(),
        source: e,
    })?;

    copy_atomic(candidate, &source_meta, &parent, &dest)?;

    info!(
        rel_path,
        pack = %candidate.pack_name,
        "Applied texture selection"
    );

    Ok(SelectOutcome::Written)
}

/// Clear the selection for `rel_path` by removing the output file.
///
/// Returns `true` if a file was removed, `false` if the slot was already
/// empty.
pub fn deselect(output_dir: &Path, rel_path: &str) -> MixResult<bool> {
    let dest = join_relative(output_dir, rel_path)?;

    match fs::remove_file(&dest) {
        Ok(()) => {
            info!(rel_path, "Cleared texture selection");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MixError::RemoveFailed {
            path: dest,
            source: e,
        }),
    }
}

fn source_metadata(candidate: &Candidate) -> MixResult<Metadata> {
    let missing = || MixError::SourceMissing {
        pack: candidate.pack_name.clone(),
        path: candidate.path.clone(),
    };

    match fs::metadata(&candidate.path) {
        Ok(meta) if meta.is_file() => Ok(meta),
        Ok(_) => Err(missing()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(missing()),
        Err(e) => Err(MixError::ReadFailed {
            path: candidate.path.clone(),
            source: e,
        }),
    }
}

fn already_materialized(dest: &Path, candidate: &Candidate, source_meta: &Metadata) -> bool {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_file() && meta.len() == source_meta.len() => {}
        _ => return false,
    }

    match (fs::read(dest), fs::read(&candidate.path)) {
        (Ok(existing), Ok(wanted)) => existing == wanted,
        _ => false,
    }
}

fn copy_atomic(
    candidate: &Candidate,
    source_meta: &Metadata,
    parent: &Path,
    dest: &Path,
) -> MixResult<()> {
    let copy_failed = |source: io::Error| MixError::CopyFailed {
        path: dest.to_path_buf(),
        source,
    };

    let mut source = File::open(&candidate.path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            MixError::SourceMissing {
                pack: candidate.pack_name.clone(),
                path: candidate.path.clone(),
            }
        } else {
            MixError::ReadFailed {
                path: candidate.path.clone(),
                source: e,
            }
        }
    })?;

    // Dropping the temp file on any error below removes it
    let mut temp = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(copy_failed)?;

    io::copy(&mut source, temp.as_file_mut()).map_err(copy_failed)?;
    temp.as_file().sync_all().map_err(copy_failed)?;

    fs::set_permissions(temp.path(), source_meta.permissions()).map_err(copy_failed)?;
    filetime::set_file_times(
        temp.path(),
        FileTime::from_last_access_time(source_meta),
        FileTime::from_last_modification_time(source_meta),
    )
    .map_err(copy_failed)?;

    temp.persist(dest).map_err(|e| copy_failed(e.error))?;
    Ok(())
}

/// Path of the output slot for `rel_path`.
pub fn output_path(output_dir: &Path, rel_path: &str) -> MixResult<PathBuf> {
    join_relative(output_dir, rel_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{resolve_path, SelectionState};
    use tempfile::TempDir;

    const STONE: &str = "assets/minecraft/textures/block/stone.png";

    struct Fixture {
        temp: TempDir,
        a: Candidate,
        b: Candidate,
    }

    impl Fixture {
        fn out(&self) -> PathBuf {
            self.temp.path().join("out")
        }

        fn candidates(&self) -> Vec<Candidate> {
            vec![self.a.clone(), self.b.clone()]
        }
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let make = |pack: &str, content: &[u8]| {
            let path = temp.path().join("mix").join(pack).join(STONE);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            Candidate::new(pack, path)
        };
        let a = make("A", b"stone from a");
        let b = make("B", b"stone from b, longer");
        Fixture { temp, a, b }
    }

    #[test]
    fn test_select_creates_parents_and_copies() {
        let f = fixture();

        let outcome = select(&f.out(), STONE, &f.b).unwrap();

        assert_eq!(outcome, SelectOutcome::Written);
        assert_eq!(
            fs::read(f.out().join(STONE)).unwrap(),
            b"stone from b, longer"
        );
        assert_eq!(
            resolve_path(&f.out(), STONE, &f.candidates()).unwrap(),
            SelectionState::Selected(f.b.clone())
        );
    }

    #[test]
    fn test_select_is_idempotent() {
        let f = fixture();

        select(&f.out(), STONE, &f.a).unwrap();
        let first = fs::read(f.out().join(STONE)).unwrap();
        let outcome = select(&f.out(), STONE, &f.a).unwrap();
        let second = fs::read(f.out().join(STONE)).unwrap();

        assert_eq!(outcome, SelectOutcome::Unchanged);
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_replaces_previous_candidate() {
        let f = fixture();

        select(&f.out(), STONE, &f.b).unwrap();
        select(&f.out(), STONE, &f.a).unwrap();

        assert_eq!(fs::read(f.out().join(STONE)).unwrap(), b"stone from a");
        assert_eq!(
            resolve_path(&f.out(), STONE, &f.candidates()).unwrap(),
            SelectionState::Selected(f.a.clone())
        );
    }

    #[test]
    fn test_select_leaves_no_partial_files() {
        let f = fixture();
        select(&f.out(), STONE, &f.a).unwrap();

        let dir = f.out().join(STONE);
        let names: Vec<_> = fs::read_dir(dir.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["stone.png".to_string()]);
    }

    #[test]
    fn test_select_preserves_modification_time() {
        let f = fixture();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&f.a.path, mtime).unwrap();

        select(&f.out(), STONE, &f.a).unwrap();

        let meta = fs::metadata(f.out().join(STONE)).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn test_select_missing_source() {
        let f = fixture();
        fs::remove_file(&f.a.path).unwrap();

        let result = select(&f.out(), STONE, &f.a);

        assert!(matches!(result, Err(MixError::SourceMissing { ref pack, .. }) if pack == "A"));
        assert!(!f.out().join(STONE).exists());
    }

    #[test]
    fn test_select_rejects_escaping_path() {
        let f = fixture();
        let result = select(&f.out(), "../escape.png", &f.a);
        assert!(matches!(result, Err(MixError::InvalidRelativePath(_))));
    }

    #[test]
    fn test_copy_failure_keeps_previous_output() {
        let f = fixture();
        // A non-empty directory in the slot cannot be renamed over
        let slot = f.out().join(STONE);
        fs::create_dir_all(&slot).unwrap();
        fs::write(slot.join("keep.txt"), b"kept").unwrap();

        let result = select(&f.out(), STONE, &f.b);

        assert!(matches!(result, Err(MixError::CopyFailed { ref path, .. }) if path == &slot));
        assert_eq!(fs::read(slot.join("keep.txt")).unwrap(), b"kept");

        let mut names: Vec<_> = fs::read_dir(slot.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["stone.png".to_string()]);
    }

    #[test]
    fn test_deselect() {
        let f = fixture();
        select(&f.out(), STONE, &f.a).unwrap();

        assert!(deselect(&f.out(), STONE).unwrap());
        assert!(!f.out().join(STONE).exists());
        assert_eq!(
            resolve_path(&f.out(), STONE, &f.candidates()).unwrap(),
            SelectionState::Absent
        );
    }

    #[test]
    fn test_deselect_absent_is_noop() {
        let f = fixture();
        assert!(!deselect(&f.out(), STONE).unwrap());
        assert!(!f.out().exists());
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/out"), STONE).unwrap();
        assert_eq!(path, Path::new("/out").join(STONE));
    }
}
