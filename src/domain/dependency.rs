//! Dependency information structures

use super::VersionSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A package dependency read from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name as written in the manifest
    pub name: String,
    /// Declared version constraint, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<VersionSpec>,
    /// 1-based line number in the manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, constraint: Option<VersionSpec>) -> Self {
        Self {
            name: name.into(),
            constraint,
            line: None,
        }
    }

    /// Creates a dependency pinned to an exact version
    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, Some(VersionSpec::exact(version)))
    }

    /// Creates a dependency without a version constraint
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Records where the dependency was declared (builder pattern)
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns the pinned version, if the constraint pins one
    pub fn declared_version(&self) -> Option<&str> {
        self.constraint.as_ref().and_then(VersionSpec::pinned_version)
    }

    /// Returns true if the dependency is pinned to one version
    pub fn is_pinned(&self) -> bool {
        self.constraint
            .as_ref()
            .map(VersionSpec::is_pinned)
            .unwrap_or(false)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(spec) => write!(f, "{}{}", self.name, spec),
            None => write!(f, "{}", self.name),
        }
    }
}
