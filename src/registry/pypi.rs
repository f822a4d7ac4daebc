//! PyPI JSON API adapter
//!
//! Fetches release information from PyPI.
//! API endpoint: {index}/pypi/{package}/json

use crate::check::Release;
use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageIndex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Public PyPI base URL
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a project name (lowercase, separator runs collapsed to `-`)
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN
        .replace_all(name.trim(), "-")
        .to_ascii_lowercase()
}

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Release files keyed by version
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    /// Upload time for the release file
    upload_time_iso_8601: Option<String>,
    #[serde(default)]
    yanked: bool,
}

impl PyPIAdapter {
    /// Create a new PyPI adapter for the public index
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_INDEX_URL)
    }

    /// Create an adapter for a mirror or test server
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, normalize_name(package))
    }

    /// Earliest upload time of the non-yanked files, or None if every file is yanked
    fn release_from_files(version: String, files: &[ReleaseFile]) -> Option<Release> {
        let live: Vec<&ReleaseFile> = files.iter().filter(|f| !f.yanked).collect();
        if live.is_empty() {
            return None;
        }

        let mut earliest_time: Option<DateTime<Utc>> = None;
        for file_info in live {
            if let Some(time_str) = &file_info.upload_time_iso_8601 {
                if let Ok(time) = time_str.parse::<DateTime<Utc>>() {
                    earliest_time = Some(match earliest_time {
                        Some(current) if time < current => time,
                        Some(current) => current,
                        None => time,
                    });
                }
            }
        }

        Some(Release::new(version, earliest_time))
    }
}

#[async_trait]
impl PackageIndex for PyPIAdapter {
    fn registry_name(&self) -> &'static str {
        "PyPI"
    }

    async fn fetch_releases(&self, package: &str) -> Result<Vec<Release>, RegistryError> {
        let url = self.build_url(package);
        debug!(package, url = %url, "fetching releases");

        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        let mut releases: Vec<Release> = response
            .releases
            .into_iter()
            .filter_map(|(version, files)| Self::release_from_files(version, &files))
            .collect();

        if releases.is_empty() {
            return Err(RegistryError::no_releases(package, self.registry_name()));
        }

        releases.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(releases)
    }
}
