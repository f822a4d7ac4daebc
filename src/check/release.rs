//! Release information from the package index
//!
//! This module provides the Release struct that represents
//! a published version with its upload date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published version as reported by the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// The version string (e.g., "2.31.0")
    pub version: String,
    /// Earliest upload time among the release files
    pub released_at: Option<DateTime<Utc>>,
}

impl Release {
    /// Create a new Release
    pub fn new(version: impl Into<String>, released_at: Option<DateTime<Utc>>) -> Self {
        Self {
            version: version.into(),
            released_at,
        }
    }

    /// Create a Release without an upload date
    pub fn undated(version: impl Into<String>) -> Self {
        Self::new(version, None)
    }
}
