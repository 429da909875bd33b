//! User interface module - progress reporting and formatting.
//!
//! The workflow never prints directly. It talks to a [Reporter] handed in by
//! the caller:
//! - [ConsoleReporter] - styled output on stdout/stderr
//! - [MemoryReporter] - collects messages, for tests
//! - `formatter` - pure formatting functions

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::boundary::BoundaryWarning;
use crate::outputs;

pub mod formatter;

pub use formatter::{format_summary, format_summary_markdown, RunSummary};

/// Observer for human-readable progress of a run
pub trait Reporter {
    fn status(&self, message: &str);
    fn success(&self, message: &str);
    fn warning(&self, warning: &BoundaryWarning);
    fn summary(&self, summary: &RunSummary);
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn status(&self, message: &str) {
        (**self).status(message)
    }

    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn warning(&self, warning: &BoundaryWarning) {
        (**self).warning(warning)
    }

    fn summary(&self, summary: &RunSummary) {
        (**self).summary(summary)
    }
}

/// Reporter printing styled lines.
///
/// Progress goes to stderr so stdout stays free for step outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn status(&self, message: &str) {
        eprintln!("{}", formatter::format_status(message));
    }

    fn success(&self, message: &str) {
        eprintln!("{}", formatter::format_success(message));
    }

    fn warning(&self, warning: &BoundaryWarning) {
        eprintln!("{}", formatter::format_warning(&warning.to_string()));
    }

    /// Also appends the summary to the Actions job summary when running in CI.
    fn summary(&self, summary: &RunSummary) {
        eprintln!("\n{}", formatter::format_heading("Version Update Summary"));
        match format_summary(summary) {
            Ok(table) => eprint!("{}", table),
            Err(e) => debug!(error = %e, "could not render summary table"),
        }

        if let Err(e) = outputs::append_step_summary(summary) {
            warn!(error = %e, "could not write job summary");
        }
    }
}

/// Print a fatal error the way the binary reports failures
pub fn display_error(message: &str) {
    eprintln!("{}", formatter::format_error(message));
}

/// One message captured by [MemoryReporter]
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Status(String),
    Success(String),
    Warning(BoundaryWarning),
    Summary(RunSummary),
}

/// Reporter that keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: RefCell<Vec<Report>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<BoundaryWarning> {
        self.reports
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Report::Warning(w) => Some(w.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any status or success line contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.reports.borrow().iter().any(|r| match r {
            Report::Status(m) | Report::Success(m) => m.contains(needle),
            _ => false,
        })
    }
}

impl Reporter for MemoryReporter {
    fn status(&self, message: &str) {
        self.reports
            .borrow_mut()
            .push(Report::Status(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.reports
            .borrow_mut()
            .push(Report::Success(message.to_string()));
    }

    fn warning(&self, warning: &BoundaryWarning) {
        self.reports
            .borrow_mut()
            .push(Report::Warning(warning.clone()));
    }

    fn summary(&self, summary: &RunSummary) {
        self.reports
            .borrow_mut()
            .push(Report::Summary(summary.clone()));
    }
}
