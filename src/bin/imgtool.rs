//! Image Compressor and Metadata Remover CLI
//!
//! Re-encodes JPEGs at a chosen quality, optionally shrinking them, and drops
//! EXIF, GPS, camera and copyright data on the way.

use std::process::ExitCode;

use clap::Parser;
use squeeze::cli::{execute, fail, CommonArgs, SelectionArgs};
use squeeze::{ImageOptions, JpegCompressor, Quality, ResizeBounds};

/// Compress JPG images and remove metadata. Supports single file or batch folder processing.
#[derive(Parser, Debug)]
#[command(name = "imgtool", author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    selection: SelectionArgs,

    /// JPG quality (1-95). Lower means more compression
    #[arg(short = 'q', long = "quality", default_value_t = 85, allow_negative_numbers = true)]
    quality: i64,

    /// Optional max width to resize to
    #[arg(long = "max-width", value_parser = clap::value_parser!(u32).range(1..))]
    max_width: Option<u32>,

    /// Optional max height to resize to
    #[arg(long = "max-height", value_parser = clap::value_parser!(u32).range(1..))]
    max_height: Option<u32>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    squeeze::logging::init(args.common.verbose)?;

    // checked before anything touches the filesystem
    let quality = match Quality::new(args.quality) {
        Ok(quality) => quality,
        Err(e) => return Ok(fail(&e)),
    };

    let compressor = JpegCompressor::new(ImageOptions {
        quality,
        bounds: ResizeBounds {
            max_width: args.max_width,
            max_height: args.max_height,
        },
    });

    Ok(execute(args.selection.into(), &compressor, &args.common))
}
