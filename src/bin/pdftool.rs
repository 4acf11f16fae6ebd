//! PDF Compressor and Metadata Remover CLI
//!
//! Compresses PDFs with Ghostscript and strips their metadata, one file or a
//! whole folder at a time.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use squeeze::cli::{execute, CommonArgs, SelectionArgs};
use squeeze::{GhostscriptCompressor, PdfOptions, Preset};

/// Compress PDF files and remove metadata. Supports single file or batch folder processing.
#[derive(Parser, Debug)]
#[command(name = "pdftool", author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Compression preset
    #[arg(short = 'c', long = "compression", value_enum, default_value_t = Preset::Ebook)]
    compression: Preset,

    /// Ghostscript executable
    #[arg(long = "gs", env = "SQUEEZE_GHOSTSCRIPT", default_value = "gs")]
    ghostscript: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    squeeze::logging::init(args.common.verbose)?;

    let compressor = GhostscriptCompressor::new(PdfOptions {
        preset: args.compression,
        ghostscript: args.ghostscript,
    });

    Ok(execute(args.selection.into(), &compressor, &args.common))
}
