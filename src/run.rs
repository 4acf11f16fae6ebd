//! Single-file and folder runs.

use std::path::PathBuf;

use crate::compressor::Compressor;
use crate::confirm::OverwritePolicy;
use crate::error::{Result, SqueezeError};
use crate::invoke::run_job;
use crate::plan::{default_single_output, mirror_path, resolve_output_folder, BatchPlan, Job};
use crate::report::{OutcomeRecord, RunSummary};
use crate::select::Mode;
use crate::traverse;

/// Options shared by every job of a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Remove each source once its output is written
    pub delete_original: bool,
}

/// Execute a validated [`Mode`].
///
/// Errors returned here end the run before or instead of any job (an input
/// folder that cannot be listed, an output folder that cannot be created).
/// Per-job failures and unreadable subfolders are recorded in the summary.
pub fn run(
    mode: Mode,
    compressor: &dyn Compressor,
    policy: &mut dyn OverwritePolicy,
    options: &RunOptions,
) -> Result<RunSummary> {
    match mode {
        Mode::Single { input, output } => {
            let destination = output.unwrap_or_else(|| default_single_output(&input));
            let job = Job {
                source: input,
                destination,
            };
            Ok(run_single(&job, compressor, policy, options))
        }
        Mode::Batch {
            input_folder,
            output_folder,
            recursive,
        } => {
            let output_root = resolve_output_folder(&input_folder, output_folder.as_deref())?;
            std::fs::read_dir(&input_folder).map_err(|e| SqueezeError::path(&input_folder, e))?;

            let mut unreadable = Vec::new();
            let files: Vec<PathBuf> = traverse::candidates(
                &input_folder,
                recursive,
                compressor.kind(),
                Some(&output_root),
            )
            .filter_map(|found| match found {
                Ok(path) => Some(path),
                Err(e) => {
                    unreadable.push(e);
                    None
                }
            })
            .collect();

            let plan = BatchPlan::new(input_folder.clone(), output_root.clone(), files);
            run_batch(&plan, unreadable, compressor, policy, options)
        }
    }
}

fn run_single(
    job: &Job,
    compressor: &dyn Compressor,
    policy: &mut dyn OverwritePolicy,
    options: &RunOptions,
) -> RunSummary {
    let mut summary = RunSummary::new();
    let kind = compressor.kind();

    if !kind.matches(&job.destination)
        && !policy.allow_unexpected_extension(&job.destination, &kind.describe_extensions())
    {
        summary.push(OutcomeRecord::skipped(
            job.source.clone(),
            job.destination.clone(),
            format!(
                "output does not end with {}, not confirmed",
                kind.describe_extensions()
            ),
        ));
        return summary;
    }

    if let Some(record) = confirm_overwrite(job, policy) {
        summary.push(record);
        return summary;
    }

    tracing::info!("Processing: {}", job.source.display());
    summary.push(run_job(compressor, job, options.delete_original));
    summary
}

/// Run every job of a plan, creating the output folder first.
///
/// Each folder the walk could not read becomes one failed record. A plan
/// without jobs creates nothing.
fn run_batch(
    plan: &BatchPlan,
    unreadable: Vec<SqueezeError>,
    compressor: &dyn Compressor,
    policy: &mut dyn OverwritePolicy,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::new();

    for error in unreadable {
        let source = match &error {
            SqueezeError::PathError { path, .. } => path.clone(),
            _ => plan.input_root.clone(),
        };
        let destination = mirror_path(&plan.input_root, &plan.output_root, &source)
            .unwrap_or_else(|| plan.output_root.clone());
        tracing::warn!("Cannot read {}", source.display());
        summary.push(OutcomeRecord::failed(source, destination, error));
    }

    if plan.is_empty() {
        if summary.records().is_empty() {
            println!(
                "No {} files found in the input folder.",
                compressor.kind().label
            );
        }
        return Ok(summary);
    }

    plan.create_output_root()?;

    for job in &plan.jobs {
        if let Some(record) = confirm_overwrite(job, policy) {
            summary.push(record);
            continue;
        }

        tracing::info!("Processing: {}", job.source.display());
        summary.push(run_job(compressor, job, options.delete_original));
    }

    tracing::info!(
        "Batch compression completed. {} files processed and saved at: {}",
        plan.len(),
        plan.output_root.display()
    );

    Ok(summary)
}

/// A skipped record when the destination exists and may not be replaced.
fn confirm_overwrite(job: &Job, policy: &mut dyn OverwritePolicy) -> Option<OutcomeRecord> {
    if job.destination.exists() && !policy.allow_overwrite(&job.destination) {
        tracing::info!("Not overwriting {}", job.destination.display());
        return Some(OutcomeRecord::skipped(
            job.source.clone(),
            job.destination.clone(),
            "output exists, overwrite declined",
        ));
    }
    None
}
