//! Human- and machine-readable rendering of cleanup reports.

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};

use tagsweep_core::format_size;

use crate::report::{RepositoryOutcome, RepositoryReport, RunReport};

/// Renders cleanup progress and results.
pub trait Reporter {
    /// Reports one finished repository.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing to output fails.
    fn repository(&self, report: &RepositoryReport) -> io::Result<()>;

    /// Reports the finished run.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing to output fails.
    fn summary(&self, report: &RunReport) -> io::Result<()>;
}

/// Console reporter that writes progress lines to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    use_colors: bool,
}

impl ConsoleReporter {
    /// Creates a new console reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self { use_colors: true }
    }

    /// Sets whether to use colors.
    #[must_use]
    pub const fn with_colors(mut self, colors: bool) -> Self {
        self.use_colors = colors;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.use_colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Formats the lines for one repository.
    fn format_repository(&self, report: &RepositoryReport) -> String {
        let name = &report.repository;
        let mut out = String::new();

        match &report.outcome {
            RepositoryOutcome::NoDeletionNeeded => {
                let _ = write!(
                    out,
                    "repo: {name} has {} tags, keeping {}, nothing to delete",
                    report.tags_before, report.tags_after
                );
            }
            RepositoryOutcome::FetchFailed { reason } => {
                let _ = write!(
                    out,
                    "{} repo: {name} skipped: {reason}",
                    self.paint("✗", "31")
                );
            }
            RepositoryOutcome::Cancelled if report.tags_before == 0 => {
                let _ = write!(out, "repo: {name} not processed (cancelled)");
            }
            RepositoryOutcome::DryRun => {
                let _ = write!(
                    out,
                    "repo: {name} has {} tags, keeping {}, would delete {}",
                    report.tags_before,
                    report.tags_after,
                    report.planned.len()
                );
                for tag in &report.planned {
                    let _ = write!(
                        out,
                        "\n    would delete {name}:{} (created {})",
                        tag.name,
                        tag.created.to_rfc3339()
                    );
                }
                let _ = write!(
                    out,
                    "\nrepo: {name} would free {}",
                    format_size(report.planned_bytes())
                );
            }
            RepositoryOutcome::Cleaned | RepositoryOutcome::Cancelled => {
                let _ = write!(
                    out,
                    "repo: {name} has {} tags, keeping {}, deleting {}",
                    report.tags_before,
                    report.tags_after,
                    report.planned.len()
                );
                for tag in &report.deleted {
                    let _ = write!(
                        out,
                        "\n    {} deleted {name}:{} (created {})",
                        self.paint("✓", "32"),
                        tag.name,
                        tag.created.to_rfc3339()
                    );
                }
                for failure in &report.failures {
                    let _ = write!(
                        out,
                        "\n    {} {name}:{} not deleted: {}",
                        self.paint("✗", "31"),
                        failure.tag.name,
                        failure.reason
                    );
                }
                if report.outcome == RepositoryOutcome::Cancelled {
                    let _ = write!(out, "\n    cancelled before all tags were processed");
                }
                let _ = write!(
                    out,
                    "\nrepo: {name} freed {}",
                    format_size(report.reclaimed_bytes)
                );
            }
        }

        out
    }

    /// Formats the run summary.
    fn format_summary(&self, report: &RunReport) -> String {
        let status = if report.cancelled {
            self.paint("CANCELLED", "33")
        } else if report.has_failures() {
            self.paint("COMPLETED WITH FAILURES", "31")
        } else {
            self.paint("COMPLETED", "32")
        };

        let skipped = report.skipped_repositories().count();

        if report.dry_run {
            format!(
                "\n{status} (dry run): project {}, {} repositories, {} tags would be deleted, {} would be freed",
                report.project,
                report.repositories.len(),
                report
                    .repositories
                    .iter()
                    .map(|r| r.planned.len())
                    .sum::<usize>(),
                format_size(report.planned_bytes())
            )
        } else {
            format!(
                "\n{status}: project {}, {} repositories ({skipped} skipped), {} tags deleted, {} failed, {} freed",
                report.project,
                report.repositories.len(),
                report.deleted_count(),
                report.failed_count(),
                format_size(report.reclaimed_bytes)
            )
        }
    }
}

impl Reporter for ConsoleReporter {
    fn repository(&self, report: &RepositoryReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", self.format_repository(report))
    }

    fn summary(&self, report: &RunReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", "─".repeat(50))?;
        writeln!(stdout, "{}", self.format_summary(report))
    }
}

/// JSON reporter that writes the run report as one JSON document.
#[derive(Debug, Default)]
pub struct JsonReporter {
    pretty: bool,
}

impl JsonReporter {
    /// Creates a new JSON reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to pretty-print.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn render(&self, report: &RunReport) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        }
    }
}

impl Reporter for JsonReporter {
    // Per-repository results are part of the summary document.
    fn repository(&self, _report: &RepositoryReport) -> io::Result<()> {
        Ok(())
    }

    fn summary(&self, report: &RunReport) -> io::Result<()> {
        let json = self.render(report).map_err(io::Error::other)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}")
    }
}
