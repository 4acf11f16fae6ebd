//! Folder traversal.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SqueezeError};
use crate::select::FileKind;

/// Lazily yield the files under `root` whose extension belongs to `kind`.
///
/// Without `recursive` only the immediate children of `root` are visited.
/// Entries are visited depth-first in file-name order. Files of any other
/// kind are skipped without comment, and so is the whole subtree at
/// `exclude` (a previous run's output folder living inside the input).
/// A folder that cannot be read comes out as a [`SqueezeError::PathError`]
/// naming it, and the walk carries on with its siblings.
pub fn candidates<'a>(
    root: &Path,
    recursive: bool,
    kind: &'a FileKind,
    exclude: Option<&'a Path>,
) -> impl Iterator<Item = Result<PathBuf>> + 'a {
    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }
    let exclude_abs = exclude.and_then(|dir| dir.canonicalize().ok());
    let root = root.to_path_buf();

    walker
        .into_iter()
        .filter_entry(move |entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match exclude {
                Some(skip) => !is_same_dir(entry.path(), skip, exclude_abs.as_deref()),
                None => true,
            }
        })
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_file() && kind.matches(entry.path()) => {
                Some(Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(walk_error(&root, e))),
        })
}

fn walk_error(root: &Path, e: walkdir::Error) -> SqueezeError {
    let path = e.path().unwrap_or(root).to_path_buf();
    let message = e.to_string();
    let source = e.into_io_error().unwrap_or_else(|| io::Error::other(message));
    SqueezeError::path(path, source)
}

fn is_same_dir(path: &Path, dir: &Path, dir_abs: Option<&Path>) -> bool {
    if path == dir {
        return true;
    }
    match (path.canonicalize(), dir_abs) {
        (Ok(path), Some(dir)) => path == dir,
        _ => false,
    }
}
