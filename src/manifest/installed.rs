//! Installed packages listed by pip
//!
//! Runs `pip list --format=json` and turns every installed distribution into
//! a dependency pinned to its installed version.

use crate::domain::Dependency;
use crate::error::ManifestError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// One entry of `pip list --format=json`
#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
    version: String,
}

/// Trait for listing installed packages
pub trait InstalledLister {
    /// Return the raw JSON produced by the listing command
    fn list_json(&self) -> Result<String, ManifestError>;
}

/// Lists packages by running pip
#[derive(Debug, Clone)]
pub struct PipLister {
    program: String,
    project_path: Option<PathBuf>,
}

impl PipLister {
    /// Create a lister; `--path` is only passed for a non-default project path
    pub fn new(project_path: &Path) -> Self {
        let project_path = if project_path == Path::new(".") {
            None
        } else {
            Some(project_path.to_path_buf())
        };
        Self {
            program: "pip".to_string(),
            project_path,
        }
    }

    /// Use a different pip executable (e.g. `pip3`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to pip
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["list".to_string(), "--format=json".to_string()];
        if let Some(path) = &self.project_path {
            args.push("--path".to_string());
            args.push(path.display().to_string());
        }
        args
    }

    fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args().join(" "))
    }
}

impl InstalledLister for PipLister {
    fn list_json(&self) -> Result<String, ManifestError> {
        debug!(command = %self.command_line(), "listing installed packages");

        let output = Command::new(&self.program)
            .args(self.args())
            .output()
            .map_err(|e| ManifestError::installed_list_error(self.command_line(), e.to_string()))?;

        if !output.status.success() {
            return Err(ManifestError::installed_list_error(
                self.command_line(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse the JSON printed by `pip list --format=json`
pub fn parse_pip_list(json: &str) -> Result<Vec<Dependency>, ManifestError> {
    let entries: Vec<PipListEntry> = serde_json::from_str(json).map_err(|e| {
        ManifestError::installed_list_error("pip list --format=json", format!("invalid JSON: {}", e))
    })?;

    Ok(entries
        .into_iter()
        .map(|entry| Dependency::pinned(entry.name, entry.version))
        .collect())
}

/// List installed packages as dependencies
pub fn read_installed(lister: &dyn InstalledLister) -> Result<Vec<Dependency>, ManifestError> {
    let json = lister.list_json()?;
    parse_pip_list(&json)
}
