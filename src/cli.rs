//! Command-line arguments shared by `pdftool` and `imgtool`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use crate::compressor::Compressor;
use crate::confirm::{AlwaysAllow, OverwritePolicy, Prompt};
use crate::run::{run, RunOptions};
use crate::select::Selection;

/// Which file or folder to process
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Input file path
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file path (default: <name>_compressed.<ext> next to the input)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Input folder for batch mode
    #[arg(short = 'I', long = "input-folder", value_name = "DIR")]
    pub input_folder: Option<PathBuf>,

    /// Output folder for batch mode (default: <folder>_compressed next to the input)
    #[arg(short = 'O', long = "output-folder", value_name = "DIR")]
    pub output_folder: Option<PathBuf>,

    /// Recursively process subfolders (only with --input-folder)
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Selection {
            input: args.input,
            output: args.output,
            input_folder: args.input_folder,
            output_folder: args.output_folder,
            recursive: args.recursive,
        }
    }
}

/// Behaviour flags common to both tools
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// Delete original files after successful compression
    #[arg(long = "delete-original")]
    pub delete_original: bool,

    /// Overwrite existing outputs without asking
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Resolve, run, report. Returns the process exit status.
pub fn execute(selection: Selection, compressor: &dyn Compressor, common: &CommonArgs) -> ExitCode {
    let mode = match selection.resolve(compressor.kind()) {
        Ok(mode) => mode,
        Err(e) => return fail(&e),
    };

    let mut policy: Box<dyn OverwritePolicy> = if common.force {
        Box::new(AlwaysAllow)
    } else {
        Box::new(Prompt::stdin())
    };

    let options = RunOptions {
        delete_original: common.delete_original,
    };

    match run(mode, compressor, policy.as_mut(), &options) {
        Ok(summary) => {
            summary.print(common.verbose);
            ExitCode::from(summary.exit_code())
        }
        Err(e) => fail(&e),
    }
}

/// Print a fatal error and map it to an exit status.
pub fn fail(error: &crate::SqueezeError) -> ExitCode {
    eprintln!("error: {error}");
    ExitCode::from(error.exit_code())
}
