//! Core domain models for pipstale
//!
//! This module contains the fundamental types used throughout the application:
//! - Version specification types parsed from requirement lines
//! - Dependency information structures
//! - Security advisories attached to a dependency
//! - Per-dependency check results and the final report

mod advisory;
mod dependency;
mod report;
mod version_info;
mod version_spec;

pub use advisory::{Advisory, Severity};
pub use dependency::Dependency;
pub use report::{Report, ReportSummary, SecurityCheck};
pub use version_info::{VersionInfo, VersionStatus};
pub use version_spec::{VersionSpec, VersionSpecKind};
