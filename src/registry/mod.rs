//! Package index adapters for fetching release information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - PyPI JSON API adapter

mod client;
mod pypi;

pub use client::HttpClient;
pub use pypi::{normalize_name, PyPIAdapter, DEFAULT_INDEX_URL};

use crate::check::Release;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Trait for package index adapters
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Get the index name used in messages
    fn registry_name(&self) -> &'static str;

    /// Fetch every published, non-yanked release of a package
    async fn fetch_releases(&self, package: &str) -> Result<Vec<Release>, RegistryError>;
}
