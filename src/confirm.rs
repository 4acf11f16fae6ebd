//! Overwrite confirmation.
//!
//! Asking on the console blocks the run, so the decision sits behind
//! [`OverwritePolicy`]. The binaries pick [`AlwaysAllow`] under `--force`
//! and [`Prompt`] on stdin otherwise; tests use the fixed policies or a
//! `Prompt` over an in-memory reader.

use std::io::{BufRead, Write};
use std::path::Path;

pub trait OverwritePolicy {
    /// May `path`, which already exists, be replaced?
    fn allow_overwrite(&mut self, path: &Path) -> bool;

    /// May the run write to `path` even though its extension is not one the
    /// tool produces?
    fn allow_unexpected_extension(&mut self, path: &Path, expected: &str) -> bool;
}

/// Accept everything (`--force`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAllow;

impl OverwritePolicy for AlwaysAllow {
    fn allow_overwrite(&mut self, _path: &Path) -> bool {
        true
    }

    fn allow_unexpected_extension(&mut self, _path: &Path, _expected: &str) -> bool {
        true
    }
}

/// Refuse everything
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDeny;

impl OverwritePolicy for AlwaysDeny {
    fn allow_overwrite(&mut self, _path: &Path) -> bool {
        false
    }

    fn allow_unexpected_extension(&mut self, _path: &Path, _expected: &str) -> bool {
        false
    }
}

/// Ask a yes/no question and block on the answer.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompt { input, output }
    }

    fn ask(&mut self, question: &str) -> bool {
        if write!(self.output, "{question} (y/n) ").is_err() || self.output.flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

impl Prompt<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn stdin() -> Self {
        Prompt::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> OverwritePolicy for Prompt<R, W> {
    fn allow_overwrite(&mut self, path: &Path) -> bool {
        self.ask(&format!(
            "Output file \"{}\" already exists. Are you sure you want to overwrite it?",
            path.display()
        ))
    }

    fn allow_unexpected_extension(&mut self, path: &Path, expected: &str) -> bool {
        self.ask(&format!(
            "Output file \"{}\" does not end with {expected}. Are you sure you want to continue?",
            path.display()
        ))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
