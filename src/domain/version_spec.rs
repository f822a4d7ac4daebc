//! PEP 440 version specification as declared in a requirement
//!
//! Handles constraints like `==1.2.3`, `~=1.2`, `>=1.0`, `!=1.5`, `==1.2.*`
//! and comma-separated ranges such as `>=1.0,<2.0`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of version specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpecKind {
    /// Exact/pinned version (`==1.2.3`)
    Exact,
    /// Arbitrary equality (`===1.2.3`)
    ArbitraryEqual,
    /// Compatible release (`~=1.2`)
    Compatible,
    /// Greater than or equal (`>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (`>1.2.3`)
    Greater,
    /// Less than or equal (`<=1.2.3`)
    LessOrEqual,
    /// Less than (`<1.2.3`)
    Less,
    /// Exclusion (`!=1.2.3`)
    NotEqual,
    /// Prefix match (`==1.2.*`)
    Wildcard,
    /// More than one clause (`>=1.0,<2.0`)
    Range,
}

impl VersionSpecKind {
    /// Map a PEP 440 comparison operator to a kind
    pub fn from_operator(operator: &str, wildcard: bool) -> Option<Self> {
        let kind = match operator {
            "==" if wildcard => VersionSpecKind::Wildcard,
            "==" => VersionSpecKind::Exact,
            "===" => VersionSpecKind::ArbitraryEqual,
            "~=" => VersionSpecKind::Compatible,
            ">=" => VersionSpecKind::GreaterOrEqual,
            ">" => VersionSpecKind::Greater,
            "<=" => VersionSpecKind::LessOrEqual,
            "<" => VersionSpecKind::Less,
            "!=" => VersionSpecKind::NotEqual,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true if this kind pins a single version
    pub fn is_pinned(&self) -> bool {
        matches!(self, VersionSpecKind::Exact | VersionSpecKind::ArbitraryEqual)
    }
}

/// A version specification with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The kind of version specification
    pub kind: VersionSpecKind,
    /// The specifier set as it appears in the manifest (whitespace removed)
    pub raw: String,
}

impl VersionSpec {
    /// Creates a new VersionSpec
    pub fn new(kind: VersionSpecKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Shorthand for an `==` pin
    pub fn exact(version: impl Into<String>) -> Self {
        Self::new(VersionSpecKind::Exact, format!("=={}", version.into()))
    }

    /// Returns true if this specification pins one version
    pub fn is_pinned(&self) -> bool {
        self.kind.is_pinned()
    }

    /// The version named by a `==` or `===` pin.
    ///
    /// Ranges, exclusions and bounds do not declare a version.
    pub fn pinned_version(&self) -> Option<&str> {
        if self.is_pinned() {
            Some(self.raw.trim_start_matches('='))
        } else {
            None
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
