//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Outdated dependency display with colors
//! - Version change type indication (major/minor/patch)
//! - Unconstrained, unparseable and failed entries with reasons
//! - Advisories indented under their dependency
//! - Summary with detailed breakdown

use crate::check::ChangeKind;
use crate::domain::{Advisory, Report, SecurityCheck, Severity, VersionInfo, VersionStatus};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Minimum width of the name column
const MIN_NAME_WIDTH: usize = 20;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn change_label(&self, kind: ChangeKind) -> String {
        if !self.color {
            return kind.label().to_string();
        }
        match kind {
            ChangeKind::Major => kind.label().red().bold().to_string(),
            ChangeKind::Minor => kind.label().yellow().to_string(),
            ChangeKind::Patch => kind.label().green().to_string(),
            ChangeKind::Unknown => kind.label().dimmed().to_string(),
        }
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.color {
            return severity.as_str().to_string();
        }
        match severity {
            Severity::Critical => severity.as_str().red().bold().to_string(),
            Severity::High => severity.as_str().red().to_string(),
            Severity::Medium => severity.as_str().yellow().to_string(),
            Severity::Low => severity.as_str().green().to_string(),
            Severity::Unknown => severity.as_str().dimmed().to_string(),
        }
    }

    fn heading(&self, title: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", title.bold())
        } else {
            writeln!(writer, "{}", title)
        }
    }

    /// Calculate the name column width for alignment
    fn name_width<'a>(entries: impl Iterator<Item = &'a VersionInfo>) -> usize {
        entries
            .map(|e| e.name.len())
            .max()
            .unwrap_or(0)
            .max(MIN_NAME_WIDTH)
    }

    /// Format a single outdated line
    fn format_outdated_line(
        &self,
        entry: &VersionInfo,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        // Constraints that pin nothing are shown as written
        let current = entry
            .declared_version
            .as_deref()
            .or(entry.declared.as_deref())
            .unwrap_or("?");
        let latest = entry.latest_version.as_deref().unwrap_or("?");
        let change = ChangeKind::from_strings(current, latest);
        let change_display = match change {
            ChangeKind::Unknown => String::new(),
            _ => format!(" [{}]", self.change_label(change)),
        };
        let date_display = entry
            .released_at
            .map(|d| format!(" ({})", d.format("%Y/%m/%d")))
            .unwrap_or_default();

        if self.color {
            let name_display = format!("{:width$}", entry.name, width = width);
            writeln!(
                writer,
                "  {} {} {} {}{}{}",
                name_display,
                current.dimmed(),
                "→".dimmed(),
                latest.bright_white().bold(),
                change_display,
                date_display.dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {}{}{}",
                entry.name,
                current,
                latest,
                change_display,
                date_display,
                width = width
            )
        }
    }

    /// Format a line for an entry that is not outdated
    fn format_note_line(
        &self,
        entry: &VersionInfo,
        note: &str,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let declared = entry.declared.as_deref().unwrap_or("");
        if self.color {
            let name_display = format!("{:width$}", entry.name, width = width);
            writeln!(
                writer,
                "  {} {} {}",
                name_display,
                declared,
                format!("({})", note).dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} ({})",
                entry.name,
                declared,
                note,
                width = width
            )
        }
    }

    fn format_advisory(&self, advisory: &Advisory, writer: &mut dyn Write) -> std::io::Result<()> {
        let fixed = advisory
            .fixed_version
            .as_deref()
            .map(|v| format!(" (fixed in {})", v))
            .unwrap_or_default();
        let marker = if self.color {
            "!".red().bold().to_string()
        } else {
            "!".to_string()
        };
        writeln!(
            writer,
            "    {} {} [{}] {}{}",
            marker,
            advisory.display_id(),
            self.severity_label(advisory.severity),
            advisory.description,
            fixed
        )
    }

    fn format_versions(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let width = Self::name_width(report.entries.iter());
        let outdated: Vec<&VersionInfo> = report.outdated().collect();

        if outdated.is_empty() {
            // Only claim everything is current when every entry was compared
            let summary = report.summary();
            if summary.failed == 0 && summary.unparseable == 0 {
                writeln!(writer, "All dependencies are up to date.")?;
            } else {
                writeln!(writer, "No outdated dependencies found.")?;
            }
        } else {
            self.heading("Updates available:", writer)?;
            for entry in &outdated {
                self.format_outdated_line(entry, width, writer)?;
            }
        }

        if self.verbosity == Verbosity::Verbose {
            let current: Vec<&VersionInfo> = report
                .entries
                .iter()
                .filter(|e| e.status == VersionStatus::UpToDate)
                .collect();
            if !current.is_empty() {
                writeln!(writer)?;
                self.heading("Up to date:", writer)?;
                for entry in current {
                    let note = format!("latest {}", entry.latest_version.as_deref().unwrap_or("?"));
                    self.format_note_line(entry, &note, width, writer)?;
                }
            }
        }

        let unconstrained: Vec<&VersionInfo> = report
            .entries
            .iter()
            .filter(|e| e.status == VersionStatus::Unconstrained)
            .collect();
        if !unconstrained.is_empty() {
            writeln!(writer)?;
            self.heading("No version constraint:", writer)?;
            for entry in unconstrained {
                let note = format!("latest {}", entry.latest_version.as_deref().unwrap_or("?"));
                self.format_note_line(entry, &note, width, writer)?;
            }
        }

        let unparseable: Vec<&VersionInfo> = report
            .entries
            .iter()
            .filter(|e| matches!(e.status, VersionStatus::Unparseable(_)))
            .collect();
        if !unparseable.is_empty() {
            writeln!(writer)?;
            self.heading("Unparseable versions:", writer)?;
            for entry in unparseable {
                self.format_note_line(entry, &entry.status.to_string(), width, writer)?;
            }
        }

        let failures: Vec<&VersionInfo> = report.failures().collect();
        if !failures.is_empty() {
            writeln!(writer)?;
            if self.color {
                writeln!(writer, "{}", "Failed lookups:".red().bold())?;
            } else {
                writeln!(writer, "Failed lookups:")?;
            }
            for entry in failures {
                self.format_note_line(entry, &entry.status.to_string(), width, writer)?;
            }
        }

        Ok(())
    }

    fn format_security(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        match &report.security {
            SecurityCheck::NotRequested => Ok(()),
            SecurityCheck::Unavailable(reason) => {
                writeln!(writer)?;
                let line = format!("Warning: {}", reason);
                if self.color {
                    writeln!(writer, "{}", line.yellow())
                } else {
                    writeln!(writer, "{}", line)
                }
            }
            SecurityCheck::Completed => {
                writeln!(writer)?;
                let vulnerable: Vec<&VersionInfo> = report.vulnerable().collect();
                if vulnerable.is_empty() {
                    return writeln!(writer, "No known vulnerabilities found.");
                }

                if self.color {
                    writeln!(writer, "{}", "Vulnerabilities found:".red().bold())?;
                } else {
                    writeln!(writer, "Vulnerabilities found:")?;
                }
                for entry in vulnerable {
                    writeln!(
                        writer,
                        "  {} {}",
                        entry.name,
                        entry.declared_version.as_deref().unwrap_or("")
                    )?;
                    for advisory in &entry.vulnerabilities {
                        self.format_advisory(advisory, writer)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Format the one-line summary
    fn format_summary(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let summary = report.summary();
        let noun = if summary.total == 1 {
            "dependency"
        } else {
            "dependencies"
        };

        let mut parts = vec![
            format!("{} outdated", summary.outdated),
            format!("{} up to date", summary.up_to_date),
        ];
        if summary.unconstrained > 0 {
            parts.push(format!("{} unconstrained", summary.unconstrained));
        }
        if summary.unparseable > 0 {
            parts.push(format!("{} unparseable", summary.unparseable));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if report.security == SecurityCheck::Completed {
            parts.push(format!("{} vulnerable", summary.vulnerable));
        }

        let label = format!("Checked {} {}", summary.total, noun);
        if self.color {
            writeln!(writer, "{}: {}", label.bold(), parts.join(", "))
        } else {
            writeln!(writer, "{}: {}", label, parts.join(", "))
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(report, writer);
        }

        self.format_versions(report, writer)?;
        self.format_security(report, writer)?;
        writeln!(writer)?;
        self.format_summary(report, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, VersionSpec, VersionSpecKind};
    use chrono::{TimeZone, Utc};

    fn render(report: &Report, verbosity: Verbosity) -> String {
        let mut out = Vec::new();
        TextFormatter::with_color(verbosity, false)
            .format(report, &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn entry(name: &str, version: &str, latest: &str, status: VersionStatus) -> VersionInfo {
        VersionInfo::new(&Dependency::pinned(name, version), status).with_latest(latest, None)
    }

    fn sample_report() -> Report {
        let mut report = Report::new("requirements.txt");
        report.push(
            VersionInfo::new(&Dependency::pinned("requests", "2.25.0"), VersionStatus::Outdated)
                .with_latest(
                    "2.31.0",
                    Some(Utc.with_ymd_and_hms(2023, 5, 22, 15, 12, 44).unwrap()),
                ),
        );
        report.push(entry("numpy", "99.0.0", "1.26.0", VersionStatus::UpToDate));
        report
    }

    #[test]
    fn test_outdated_line() {
        let output = render(&sample_report(), Verbosity::Normal);
        assert!(output.starts_with("Updates available:\n"));
        assert!(output.contains("requests"));
        assert!(output.contains("2.25.0 -> 2.31.0 [minor] (2023/05/22)"));
        assert!(!output.contains("numpy"));
    }

    #[test]
    fn test_all_up_to_date() {
        let mut report = Report::new("requirements.txt");
        report.push(entry("numpy", "1.26.0", "1.26.0", VersionStatus::UpToDate));
        let output = render(&report, Verbosity::Normal);
        assert!(output.starts_with("All dependencies are up to date.\n"));
        assert!(output.contains("Checked 1 dependency: 0 outdated, 1 up to date"));
    }

    #[test]
    fn test_empty_report() {
        let output = render(&Report::new("requirements.txt"), Verbosity::Normal);
        assert!(output.contains("All dependencies are up to date."));
        assert!(output.contains("Checked 0 dependencies"));
    }

    #[test]
    fn test_up_to_date_claim_needs_every_entry_compared() {
        let mut report = Report::new("requirements.txt");
        report.push(entry("numpy", "1.26.0", "1.26.0", VersionStatus::UpToDate));
        report.push(VersionInfo::new(
            &Dependency::pinned("requests", "2.25.0"),
            VersionStatus::NetworkFailed("connection refused".to_string()),
        ));
        let output = render(&report, Verbosity::Normal);
        assert!(output.starts_with("No outdated dependencies found.\n"));
        assert!(output.contains("network error: connection refused"));
    }

    #[test]
    fn test_outdated_range_shows_constraint() {
        let mut report = Report::new("requirements.txt");
        let spec = VersionSpec::new(VersionSpecKind::Range, ">=1.21,<2");
        report.push(
            VersionInfo::new(&Dependency::new("urllib3", Some(spec)), VersionStatus::Outdated)
                .with_latest("2.2.0", None),
        );
        let output = render(&report, Verbosity::Normal);
        assert!(output.contains("urllib3"));
        assert!(output.contains(">=1.21,<2 -> 2.2.0\n"), "{output}");
    }

    #[test]
    fn test_verbose_lists_up_to_date() {
        let output = render(&sample_report(), Verbosity::Verbose);
        assert!(output.contains("Up to date:"));
        assert!(output.contains("numpy"));
        assert!(output.contains("(latest 1.26.0)"));
    }

    #[test]
    fn test_quiet_shows_only_summary() {
        let output = render(&sample_report(), Verbosity::Quiet);
        assert_eq!(output, "Checked 2 dependencies: 1 outdated, 1 up to date\n");
    }

    #[test]
    fn test_failures_and_unparseable_listed() {
        let mut report = Report::new("requirements.txt");
        report.push(VersionInfo::new(
            &Dependency::pinned("no-such-pkg", "1.0"),
            VersionStatus::LookupFailed("package not found".to_string()),
        ));
        let spec = VersionSpec::new(VersionSpecKind::Exact, "==1.2.x");
        report.push(
            VersionInfo::new(
                &Dependency::new("weird", Some(spec)),
                VersionStatus::Unparseable("invalid version".to_string()),
            )
            .with_latest("2.0", None),
        );
        report.push(
            VersionInfo::new(&Dependency::unconstrained("flask"), VersionStatus::Unconstrained)
                .with_latest("3.0.0", None),
        );

        let output = render(&report, Verbosity::Normal);
        assert!(output.starts_with("No outdated dependencies found.\n"));
        assert!(!output.contains("All dependencies are up to date."));
        assert!(output.contains("Failed lookups:"));
        assert!(output.contains("lookup failed: package not found"));
        assert!(output.contains("Unparseable versions:"));
        assert!(output.contains("==1.2.x"));
        assert!(output.contains("No version constraint:"));
        assert!(output.contains("(latest 3.0.0)"));
        assert!(output.contains("1 unconstrained, 1 unparseable, 1 failed"));
    }

    #[test]
    fn test_advisories_indented_under_dependency() {
        let mut report = sample_report();
        report.entries[0].vulnerabilities = vec![Advisory::new(
            "PYSEC-2023-74",
            Severity::Medium,
            "Unintended leak of Proxy-Authorization header",
        )
        .with_aliases(vec!["CVE-2023-32681".to_string()])
        .with_fixed_version("2.31.0")];
        report.security = SecurityCheck::Completed;

        let output = render(&report, Verbosity::Normal);
        assert!(output.contains("Vulnerabilities found:\n  requests 2.25.0\n"));
        assert!(output.contains(
            "    ! CVE-2023-32681 [medium] Unintended leak of Proxy-Authorization header (fixed in 2.31.0)"
        ));
        assert!(output.contains("1 vulnerable"));
    }

    #[test]
    fn test_no_vulnerabilities_found() {
        let mut report = sample_report();
        report.security = SecurityCheck::Completed;
        let output = render(&report, Verbosity::Normal);
        assert!(output.contains("No known vulnerabilities found."));
        assert!(output.contains("0 vulnerable"));
    }

    #[test]
    fn test_security_unavailable_note() {
        let mut report = sample_report();
        report.security = SecurityCheck::Unavailable(
            "security check unavailable (OSV.dev): connection refused".to_string(),
        );
        let output = render(&report, Verbosity::Normal);
        assert!(output.contains("Warning: security check unavailable (OSV.dev): connection refused"));
        assert!(!output.contains("vulnerable"));
    }

    #[test]
    fn test_no_advisories_without_security_check() {
        let output = render(&sample_report(), Verbosity::Normal);
        assert!(!output.contains("Vulnerabilities"));
        assert!(!output.contains("Security"));
    }

    #[test]
    fn test_colored_output_uses_arrow() {
        colored::control::set_override(true);
        let mut out = Vec::new();
        TextFormatter::new(Verbosity::Normal)
            .format(&sample_report(), &mut out)
            .unwrap();
        colored::control::unset_override();
        assert!(String::from_utf8(out).unwrap().contains('→'));
    }
}
