//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the report
//! - Summary counts alongside the per-dependency entries

use crate::domain::{Report, ReportSummary, SecurityCheck, VersionInfo};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Quiet mode drops the per-dependency entries
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Manifest path or installed packages
    source: &'a str,
    summary: ReportSummary,
    security: &'a SecurityCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<&'a [VersionInfo]>,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            source: &report.source,
            summary: report.summary(),
            security: &report.security,
            dependencies: if self.verbosity == Verbosity::Quiet {
                None
            } else {
                Some(report.entries.as_slice())
            },
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
