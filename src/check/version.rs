//! PEP 440 version helpers
//!
//! Thin layer over `pep440_rs` so the rest of the crate deals in
//! `VersionError` instead of the parser's own error type.

use crate::error::VersionError;
use pep508_rs::pep440_rs::{Version, VersionSpecifiers};
use std::cmp::Ordering;
use std::str::FromStr;

/// Parse a version string, accepting surrounding whitespace and a leading `v`
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VersionError::unparseable(raw, "empty version string"));
    }
    Version::from_str(trimmed).map_err(|e| VersionError::unparseable(raw, e.to_string()))
}

/// Parse a comma-separated specifier set such as `>=1.21,<3`
pub fn parse_specifiers(raw: &str) -> Result<VersionSpecifiers, VersionError> {
    VersionSpecifiers::from_str(raw.trim()).map_err(|e| {
        // The parser's message carries a caret diagram on the following lines
        let message = e.to_string();
        let first = message.lines().next().unwrap_or_default();
        VersionError::unparseable(raw, first.trim_end_matches(':'))
    })
}

/// Returns true for alpha/beta/rc and dev releases
pub fn is_prerelease(version: &Version) -> bool {
    version.is_pre() || version.is_dev()
}

/// Compare two version strings, `None` if either does not parse
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let a = parse_version(a).ok()?;
    let b = parse_version(b).ok()?;
    Some(a.cmp(&b))
}

/// Size of the jump between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// First release segment changed (breaking)
    Major,
    /// Second release segment changed (features)
    Minor,
    /// Anything smaller (fixes, post releases)
    Patch,
    /// One of the versions does not parse
    Unknown,
}

impl ChangeKind {
    /// Determine the change kind between two versions
    pub fn between(old: &Version, new: &Version) -> Self {
        let segment = |v: &Version, i: usize| v.release().get(i).copied().unwrap_or(0);

        if segment(old, 0) != segment(new, 0) {
            ChangeKind::Major
        } else if segment(old, 1) != segment(new, 1) {
            ChangeKind::Minor
        } else {
            ChangeKind::Patch
        }
    }

    /// Same as `between` for raw strings
    pub fn from_strings(old: &str, new: &str) -> Self {
        match (parse_version(old), parse_version(new)) {
            (Ok(old), Ok(new)) => Self::between(&old, &new),
            _ => ChangeKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Major => "major",
            ChangeKind::Minor => "minor",
            ChangeKind::Patch => "patch",
            ChangeKind::Unknown => "?",
        }
    }
}
