//! Output path planning.
//!
//! The path functions here are pure: they never look at the filesystem, so
//! naming and tree mirroring can be checked without creating files. The only
//! I/O is [`BatchPlan::create_output_root`] and the `.`-folder fallback in
//! [`resolve_output_folder`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, SqueezeError};

const COMPRESSED_SUFFIX: &str = "_compressed";

/// One file's planned conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Every job of a folder run, in traversal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub jobs: Vec<Job>,
}

impl BatchPlan {
    /// Plan one job per file, each mirrored from `input_root` to `output_root`.
    ///
    /// Files outside `input_root` have no mirrored location and are dropped.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let input_root = input_root.into();
        let output_root = output_root.into();

        let jobs = files
            .into_iter()
            .filter_map(|source| {
                let destination = mirror_path(&input_root, &output_root, &source)?;
                Some(Job {
                    source,
                    destination,
                })
            })
            .collect();

        BatchPlan {
            input_root,
            output_root,
            jobs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn create_output_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_root)
            .map_err(|e| SqueezeError::path(&self.output_root, e))
    }
}

/// `dir/report.PDF` becomes `dir/report_compressed.PDF`.
pub fn default_single_output(input: &Path) -> PathBuf {
    let mut name: OsString = input.file_stem().unwrap_or_default().to_os_string();
    name.push(COMPRESSED_SUFFIX);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// `scans/docs` becomes `scans/docs_compressed`.
///
/// Returns `None` when the path has no final name component (`.`, `/`).
pub fn default_output_folder(input_folder: &Path) -> Option<PathBuf> {
    let name = input_folder.file_name()?;
    let mut sibling = name.to_os_string();
    sibling.push(COMPRESSED_SUFFIX);
    Some(input_folder.with_file_name(sibling))
}

/// The explicit output folder, or the `_compressed` sibling of the input.
pub fn resolve_output_folder(input_folder: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = explicit {
        return Ok(explicit.to_path_buf());
    }

    if let Some(folder) = default_output_folder(input_folder) {
        return Ok(folder);
    }

    let absolute = input_folder
        .canonicalize()
        .map_err(|e| SqueezeError::path(input_folder, e))?;
    default_output_folder(&absolute).ok_or_else(|| {
        SqueezeError::invalid(format!(
            "Cannot derive an output folder name from {}; pass --output-folder",
            input_folder.display()
        ))
    })
}

/// Re-root `file` from `input_root` onto `output_root`, keeping its relative path.
pub fn mirror_path(input_root: &Path, output_root: &Path, file: &Path) -> Option<PathBuf> {
    let relative = file.strip_prefix(input_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(output_root.join(relative))
}

/// True when both paths name the same existing file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
