//! Manifest location and parsing
//!
//! This module provides functionality to:
//! - Locate the manifest from `-r` or the project directory
//! - Parse requirements.txt and pyproject.toml into dependencies
//! - List installed packages through pip

mod installed;
mod pyproject_toml;
mod requirement;
mod requirements_txt;

pub use installed::{parse_pip_list, read_installed, InstalledLister, PipLister};
pub use pyproject_toml::PyprojectTomlParser;
pub use requirement::parse_requirement;
pub use requirements_txt::RequirementsTxtParser;

use crate::domain::Dependency;
use crate::error::ManifestError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names looked up in the project directory, in order
pub const MANIFEST_CANDIDATES: [&str; 2] = ["requirements.txt", "pyproject.toml"];

/// Trait for parsing manifest files
pub trait ManifestParser {
    /// Parse dependencies from manifest content; `path` is used in errors
    fn parse(&self, content: &str, path: &Path) -> Result<Vec<Dependency>, ManifestError>;

    /// Human readable name of the format
    fn name(&self) -> &'static str;
}

/// Supported manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// pip requirements file
    Requirements,
    /// PEP 621 pyproject.toml
    Pyproject,
}

impl ManifestKind {
    /// Guess the format from the file name
    pub fn from_path(path: &Path) -> Self {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            ManifestKind::Pyproject
        } else {
            ManifestKind::Requirements
        }
    }
}

/// A located manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub path: PathBuf,
    pub kind: ManifestKind,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = ManifestKind::from_path(&path);
        Self { path, kind }
    }
}

/// Get a manifest parser for the specified format
pub fn get_parser(kind: ManifestKind) -> Box<dyn ManifestParser> {
    match kind {
        ManifestKind::Requirements => Box::new(RequirementsTxtParser),
        ManifestKind::Pyproject => Box::new(PyprojectTomlParser),
    }
}

/// Find the manifest to read.
///
/// An explicit path must exist. Otherwise `requirements.txt` then
/// `pyproject.toml` are tried in the project directory.
pub fn locate_manifest(
    explicit: Option<&Path>,
    project_dir: &Path,
) -> Result<ManifestFile, ManifestError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(ManifestFile::new(path));
        }
        return Err(ManifestError::not_found(path));
    }

    for candidate in MANIFEST_CANDIDATES {
        let path = project_dir.join(candidate);
        if path.is_file() {
            debug!(path = %path.display(), "found manifest");
            return Ok(ManifestFile::new(path));
        }
    }

    Err(ManifestError::not_found(
        project_dir.join(MANIFEST_CANDIDATES[0]),
    ))
}

/// Parse dependencies from a located manifest
pub fn read_manifest(manifest: &ManifestFile) -> Result<Vec<Dependency>, ManifestError> {
    let content = std::fs::read_to_string(&manifest.path)
        .map_err(|e| ManifestError::read_error(&manifest.path, e))?;

    let parser = get_parser(manifest.kind);
    let dependencies = parser.parse(&content, &manifest.path)?;
    debug!(
        path = %manifest.path.display(),
        format = parser.name(),
        count = dependencies.len(),
        "parsed manifest"
    );
    Ok(dependencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            ManifestKind::from_path(Path::new("requirements.txt")),
            ManifestKind::Requirements
        );
        assert_eq!(
            ManifestKind::from_path(Path::new("requirements-dev.in")),
            ManifestKind::Requirements
        );
        assert_eq!(
            ManifestKind::from_path(Path::new("sub/pyproject.toml")),
            ManifestKind::Pyproject
        );
    }

    #[test]
    fn test_get_parser() {
        assert_eq!(get_parser(ManifestKind::Requirements).name(), "requirements.txt");
        assert_eq!(get_parser(ManifestKind::Pyproject).name(), "pyproject.toml");
    }

    #[test]
    fn test_locate_prefers_requirements_txt() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("requirements.txt"), "requests\n").unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[project]\n").unwrap();

        let manifest = locate_manifest(None, dir.path()).unwrap();
        assert_eq!(manifest.kind, ManifestKind::Requirements);
        assert_eq!(manifest.path, dir.path().join("requirements.txt"));
    }

    #[test]
    fn test_locate_falls_back_to_pyproject() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[project]\n").unwrap();

        let manifest = locate_manifest(None, dir.path()).unwrap();
        assert_eq!(manifest.kind, ManifestKind::Pyproject);
    }

    #[test]
    fn test_locate_nothing_found() {
        let dir = TempDir::new().unwrap();
        let err = locate_manifest(None, dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_locate_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reqs-prod.txt");
        fs::write(&path, "numpy==1.26.0\n").unwrap();

        let manifest = locate_manifest(Some(&path), Path::new("/nonexistent")).unwrap();
        assert_eq!(manifest.path, path);
    }

    #[test]
    fn test_locate_explicit_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");
        let err = locate_manifest(Some(&path), dir.path()).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_read_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "requests==2.25.0\nnumpy==99.0.0\n").unwrap();

        let deps = read_manifest(&ManifestFile::new(&path)).unwrap();
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_read_manifest_pyproject() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, "[project]\ndependencies = [\"requests==2.25.0\"]\n").unwrap();

        let deps = read_manifest(&ManifestFile::new(&path)).unwrap();
        assert_eq!(deps[0].declared_version(), Some("2.25.0"));
    }
}
