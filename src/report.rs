//! Per-file outcomes and the end-of-run summary.

use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Succeeded,
    Failed(String),
    /// The job was planned but not run (declined overwrite)
    Skipped(String),
}

/// Result of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub status: Status,
    pub bytes_before: Option<u64>,
    pub bytes_after: Option<u64>,
}

impl OutcomeRecord {
    pub fn succeeded(source: PathBuf, destination: PathBuf, before: u64, after: u64) -> Self {
        Self {
            source,
            destination,
            status: Status::Succeeded,
            bytes_before: Some(before),
            bytes_after: Some(after),
        }
    }

    pub fn failed(source: PathBuf, destination: PathBuf, error: impl ToString) -> Self {
        Self {
            source,
            destination,
            status: Status::Failed(error.to_string()),
            bytes_before: None,
            bytes_after: None,
        }
    }

    pub fn skipped(source: PathBuf, destination: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            status: Status::Skipped(reason.into()),
            bytes_before: None,
            bytes_after: None,
        }
    }
}

/// All outcomes of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    records: Vec<OutcomeRecord>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, Status::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, Status::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, Status::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&Status) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.status)).count()
    }

    /// True when every planned job ran and succeeded. An empty run counts.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.records.len()
    }

    pub fn exit_code(&self) -> u8 {
        if self.all_succeeded() {
            0
        } else {
            1
        }
    }

    /// Summary text for stdout. Verbose adds one block per file.
    pub fn render(&self, verbose: bool) -> String {
        let mut out = String::new();

        if verbose {
            for record in &self.records {
                match &record.status {
                    Status::Succeeded => {
                        let _ = writeln!(out, "Compressed: {}", record.source.display());
                        let _ = writeln!(out, "  Output file: {}", record.destination.display());
                        if let (Some(before), Some(after)) = (record.bytes_before, record.bytes_after)
                        {
                            let _ = writeln!(out, "  Input file size: {} MB", megabytes(before));
                            let _ = writeln!(out, "  Output file size: {} MB", megabytes(after));
                        }
                    }
                    Status::Skipped(reason) => {
                        let _ = writeln!(out, "Skipped: {} ({reason})", record.source.display());
                    }
                    Status::Failed(_) => {}
                }
            }
        }

        let _ = writeln!(
            out,
            "Done! {} succeeded, {} failed, {} skipped",
            self.succeeded(),
            self.failed(),
            self.skipped()
        );
        out
    }

    /// One line per failed job, for stderr.
    pub fn render_failures(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            if let Status::Failed(error) = &record.status {
                let _ = writeln!(out, "Error processing {}: {error}", record.source.display());
            }
        }
        out
    }

    pub fn print(&self, verbose: bool) {
        eprint!("{}", self.render_failures());
        print!("{}", self.render(verbose));
    }
}

fn megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1_000_000.0)
}
