//! Vulnerability lookup for declared versions
//!
//! This module provides:
//! - The advisory source trait used by the orchestrator
//! - OSV.dev query adapter

mod osv;

pub use osv::{parse_cvss_score, OsvClient, DEFAULT_ADVISORY_URL};

use crate::domain::Advisory;
use crate::error::AdvisoryError;
use async_trait::async_trait;

/// Trait for vulnerability databases
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    /// Get the source name used in messages
    fn source_name(&self) -> &'static str;

    /// Known advisories affecting `package` at `version`
    async fn advisories(&self, package: &str, version: &str)
        -> Result<Vec<Advisory>, AdvisoryError>;
}
