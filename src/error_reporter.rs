use std::io::Write;
use std::path::Path;

use crate::cli::VerbosityLevel;
use crate::error::{DedupError, ProbeError};

/// Counts describing one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read from the input file
    pub total_records: usize,
    /// Records never dispatched because their key had already completed
    pub skipped_duplicates: usize,
    /// Records dropped by a failed reachability check
    pub unreachable: usize,
    /// Records written to the output file
    pub written: usize,
}

/// Console reporter with configurable verbosity
///
/// Per-record diagnostics are advisory: write failures on the console are ignored so that
/// reporting can never abort a run.
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl ErrorReporter {
    /// Create a new reporter; colors are enabled when stderr is a terminal
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stderr),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Line emitted when a record is dropped by its reachability check
    pub fn format_probe_failure(&self, url: &str, error: &ProbeError) -> String {
        format!("URL {} request failed with: {}", url, error)
    }

    /// Line emitted for a terminal input-level error
    pub fn format_input_error(&self, error: &DedupError) -> String {
        match error {
            DedupError::InputNotFound { path } => {
                format!("Error: File '{}' not found.", path.display())
            }
            DedupError::MalformedInput { path, details } => {
                let mut line = format!("Error: Failed to parse XML from file '{}'.", path.display());
                if self.verbosity >= VerbosityLevel::Verbose {
                    line.push_str(&format!("\n    {}", details));
                }
                line
            }
            other => format!("Error: {}", other),
        }
    }

    pub fn format_summary(&self, summary: &RunSummary, output: &Path) -> String {
        format!(
            "Wrote {} camera{} to {} (read {}, {} unreachable, {} duplicate{} skipped)",
            summary.written,
            if summary.written == 1 { "" } else { "s" },
            output.display(),
            summary.total_records,
            summary.unreachable,
            summary.skipped_duplicates,
            if summary.skipped_duplicates == 1 { "" } else { "s" },
        )
    }

    pub fn report_probe_failure(&self, url: &str, error: &ProbeError) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }
        let line = self.colorize(&self.format_probe_failure(url, error), "33");
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    pub fn report_input_error(&self, error: &DedupError) {
        let line = self.colorize(&self.format_input_error(error), "31");
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    pub fn report_empty_result(&self) {
        let _ = writeln!(std::io::stderr(), "No cameras found or an error occurred.");
    }

    pub fn report_summary(&self, summary: &RunSummary, output: &Path) {
        if self.verbosity >= VerbosityLevel::Verbose {
            let _ = writeln!(std::io::stderr(), "{}", self.format_summary(summary, output));
        }
    }
}
