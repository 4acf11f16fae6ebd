//! Running one job through a compressor.

use std::fs;

use crate::compressor::Compressor;
use crate::error::{Result, SqueezeError};
use crate::plan::{same_file, Job};
use crate::report::OutcomeRecord;

/// Compress `job.source` into `job.destination`.
///
/// With `delete_original` the source is removed only once the destination
/// has been written, stripped and found on disk. Any failure is captured in
/// the returned record rather than propagated.
pub fn run_job(compressor: &dyn Compressor, job: &Job, delete_original: bool) -> OutcomeRecord {
    match try_run_job(compressor, job, delete_original) {
        Ok((before, after)) => OutcomeRecord::succeeded(
            job.source.clone(),
            job.destination.clone(),
            before,
            after,
        ),
        Err(e) => {
            tracing::debug!("Failed on {}: {e}", job.source.display());
            OutcomeRecord::failed(job.source.clone(), job.destination.clone(), e)
        }
    }
}

fn try_run_job(compressor: &dyn Compressor, job: &Job, delete_original: bool) -> Result<(u64, u64)> {
    let before = fs::metadata(&job.source)
        .map_err(|e| SqueezeError::path(&job.source, e))?
        .len();

    if same_file(&job.source, &job.destination) {
        return Err(SqueezeError::path(
            &job.destination,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "destination is the source file itself",
            ),
        ));
    }

    if let Some(parent) = job.destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SqueezeError::path(parent, e))?;
        }
    }

    compressor.compress(&job.source, &job.destination)?;

    let after = fs::metadata(&job.destination)
        .map_err(|e| SqueezeError::path(&job.destination, e))?
        .len();

    if delete_original {
        fs::remove_file(&job.source).map_err(|e| SqueezeError::path(&job.source, e))?;
        tracing::debug!("Deleted original {}", job.source.display());
    }

    Ok((before, after))
}
