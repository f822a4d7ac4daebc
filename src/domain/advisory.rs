//! Security advisories reported for a declared version

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vulnerability severity levels, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A known vulnerability affecting a package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Advisory identifier (e.g. `GHSA-...`, `PYSEC-...`)
    pub id: String,
    /// Other identifiers for the same issue, typically CVE ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub severity: Severity,
    pub description: String,
    /// First version that fixes the issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl Advisory {
    pub fn new(id: impl Into<String>, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            aliases: Vec::new(),
            severity,
            description: description.into(),
            fixed_version: None,
            reference_url: None,
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_fixed_version(mut self, version: impl Into<String>) -> Self {
        self.fixed_version = Some(version.into());
        self
    }

    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_url = Some(url.into());
        self
    }

    /// The CVE alias if there is one, otherwise the advisory id
    pub fn display_id(&self) -> &str {
        if self.id.starts_with("CVE-") {
            return &self.id;
        }
        self.aliases
            .iter()
            .find(|alias| alias.starts_with("CVE-"))
            .map(String::as_str)
            .unwrap_or(&self.id)
    }
}
