//! Report types
//!
//! The report keeps one entry per manifest dependency, in manifest order.

use super::VersionInfo;
use serde::{Deserialize, Serialize};

/// Outcome of the optional security pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SecurityCheck {
    /// `--check-security` was not given
    NotRequested,
    /// Every eligible dependency was queried
    Completed,
    /// The advisory source failed, results are version-only
    Unavailable(String),
}

impl SecurityCheck {
    pub fn was_requested(&self) -> bool {
        !matches!(self, SecurityCheck::NotRequested)
    }
}

/// Full result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Where the dependencies came from (manifest path or installed packages)
    pub source: String,
    /// One entry per dependency, manifest order
    pub entries: Vec<VersionInfo>,
    pub security: SecurityCheck,
}

/// Counts derived from a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub outdated: usize,
    pub up_to_date: usize,
    pub unconstrained: usize,
    pub unparseable: usize,
    pub failed: usize,
    pub vulnerable: usize,
    pub advisories: usize,
}

impl Report {
    /// Creates an empty report
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entries: Vec::new(),
            security: SecurityCheck::NotRequested,
        }
    }

    /// Appends an entry
    pub fn push(&mut self, entry: VersionInfo) {
        self.entries.push(entry);
    }

    /// Returns true if the manifest had no dependencies
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns outdated entries
    pub fn outdated(&self) -> impl Iterator<Item = &VersionInfo> {
        self.entries.iter().filter(|e| e.is_outdated())
    }

    /// Returns entries whose lookup failed
    pub fn failures(&self) -> impl Iterator<Item = &VersionInfo> {
        self.entries.iter().filter(|e| e.is_failure())
    }

    /// Returns entries with at least one advisory
    pub fn vulnerable(&self) -> impl Iterator<Item = &VersionInfo> {
        self.entries.iter().filter(|e| e.is_vulnerable())
    }

    /// Computes summary counts
    pub fn summary(&self) -> ReportSummary {
        use super::VersionStatus;

        let mut summary = ReportSummary {
            total: self.entries.len(),
            ..ReportSummary::default()
        };
        for entry in &self.entries {
            match entry.status {
                VersionStatus::Outdated => summary.outdated += 1,
                VersionStatus::UpToDate => summary.up_to_date += 1,
                VersionStatus::Unconstrained => summary.unconstrained += 1,
                VersionStatus::Unparseable(_) => summary.unparseable += 1,
                VersionStatus::LookupFailed(_) | VersionStatus::NetworkFailed(_) => {
                    summary.failed += 1
                }
            }
            if entry.is_vulnerable() {
                summary.vulnerable += 1;
                summary.advisories += entry.vulnerabilities.len();
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Advisory, Dependency, Severity, VersionStatus};

    fn entry(name: &str, version: &str, status: VersionStatus) -> VersionInfo {
        VersionInfo::new(&Dependency::pinned(name, version), status)
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new("requirements.txt");
        assert!(report.is_empty());
        assert_eq!(report.summary(), ReportSummary::default());
        assert_eq!(report.security, SecurityCheck::NotRequested);
    }

    #[test]
    fn test_summary_counts() {
        let mut report = Report::new("requirements.txt");
        report.push(entry("requests", "2.25.0", VersionStatus::Outdated));
        report.push(entry("numpy", "99.0.0", VersionStatus::UpToDate));
        report.push(entry("nope", "1.0", VersionStatus::LookupFailed("404".into())));
        report.push(entry("odd", "1.x", VersionStatus::Unparseable("bad".into())));
        report.push(VersionInfo::new(
            &Dependency::unconstrained("flask"),
            VersionStatus::Unconstrained,
        ));

        let mut vulnerable = entry("urllib3", "1.0", VersionStatus::Outdated);
        vulnerable.vulnerabilities = vec![
            Advisory::new("A", Severity::High, "a"),
            Advisory::new("B", Severity::Low, "b"),
        ];
        report.push(vulnerable);

        let summary = report.summary();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.outdated, 2);
        assert_eq!(summary.up_to_date, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.unparseable, 1);
        assert_eq!(summary.unconstrained, 1);
        assert_eq!(summary.vulnerable, 1);
        assert_eq!(summary.advisories, 2);
        assert_eq!(report.outdated().count(), 2);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.vulnerable().count(), 1);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut report = Report::new("requirements.txt");
        report.push(entry("b", "1.0", VersionStatus::UpToDate));
        report.push(entry("a", "1.0", VersionStatus::UpToDate));
        let names: Vec<_> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_security_check_requested() {
        assert!(!SecurityCheck::NotRequested.was_requested());
        assert!(SecurityCheck::Completed.was_requested());
        assert!(SecurityCheck::Unavailable("down".into()).was_requested());
    }
}
