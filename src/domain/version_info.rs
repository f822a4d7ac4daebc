//! Per-dependency check result types

use super::{Advisory, Dependency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a dependency after comparing it with the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum VersionStatus {
    /// Declared version is the latest, or newer than it
    UpToDate,
    /// A newer version is published
    Outdated,
    /// No version constraint declared, only the latest version is known
    Unconstrained,
    /// Declared version string is not a valid version
    Unparseable(String),
    /// Index does not know the package
    LookupFailed(String),
    /// Index could not be reached or answered garbage
    NetworkFailed(String),
}

impl VersionStatus {
    /// Returns true for lookup and network failures
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            VersionStatus::LookupFailed(_) | VersionStatus::NetworkFailed(_)
        )
    }

    /// Short label used by the formatters
    pub fn label(&self) -> &'static str {
        match self {
            VersionStatus::UpToDate => "up-to-date",
            VersionStatus::Outdated => "outdated",
            VersionStatus::Unconstrained => "unconstrained",
            VersionStatus::Unparseable(_) => "unparseable",
            VersionStatus::LookupFailed(_) => "lookup failed",
            VersionStatus::NetworkFailed(_) => "network error",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStatus::Unparseable(msg)
            | VersionStatus::LookupFailed(msg)
            | VersionStatus::NetworkFailed(msg) => write!(f, "{}: {}", self.label(), msg),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// Result of checking one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Package name
    pub name: String,
    /// Declared constraint as written (e.g. `==2.25.0`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared: Option<String>,
    /// Version pinned by the constraint (`==`/`===` or an installed package)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_version: Option<String>,
    /// Latest version published on the index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Upload time of the latest version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub status: VersionStatus,
    #[serde(default)]
    pub vulnerabilities: Vec<Advisory>,
}

impl VersionInfo {
    /// Creates a result for the dependency with the given status
    pub fn new(dependency: &Dependency, status: VersionStatus) -> Self {
        Self {
            name: dependency.name.clone(),
            declared: dependency.constraint.as_ref().map(|spec| spec.raw.clone()),
            declared_version: dependency.declared_version().map(str::to_string),
            latest_version: None,
            released_at: None,
            status,
            vulnerabilities: Vec::new(),
        }
    }

    /// Sets the latest version (builder pattern)
    pub fn with_latest(
        mut self,
        version: impl Into<String>,
        released_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.latest_version = Some(version.into());
        self.released_at = released_at;
        self
    }

    /// Returns true if a newer version is available
    pub fn is_outdated(&self) -> bool {
        self.status == VersionStatus::Outdated
    }

    /// Returns true if the index lookup failed
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Returns true if any advisory was attached
    pub fn is_vulnerable(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }

    /// Version to upgrade to, only set for outdated dependencies
    pub fn recommended_version(&self) -> Option<&str> {
        if self.is_outdated() {
            self.latest_version.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declared = self.declared.as_deref().unwrap_or("");
        match &self.latest_version {
            Some(latest) => write!(f, "{}{} (latest {}): {}", self.name, declared, latest, self.status),
            None => write!(f, "{}{}: {}", self.name, declared, self.status),
        }
    }
}
