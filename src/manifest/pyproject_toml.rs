//! pyproject.toml parser for Python projects
//!
//! Handles:
//! - project.dependencies (PEP 621)
//! - project.optional-dependencies (PEP 621)

use crate::domain::Dependency;
use crate::error::ManifestError;
use crate::manifest::requirement::parse_requirement;
use crate::manifest::ManifestParser;
use std::path::Path;
use toml::Value;
use tracing::debug;

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

impl PyprojectTomlParser {
    fn collect(
        entries: &[Value],
        group: &str,
        path: &Path,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<(), ManifestError> {
        for entry in entries {
            let text = entry.as_str().ok_or_else(|| {
                ManifestError::toml_parse_error(
                    path,
                    format!("dependency in '{}' is not a string: {}", group, entry),
                )
            })?;

            match parse_requirement(text) {
                Ok(Some(dep)) => dependencies.push(dep),
                Ok(None) => debug!(group, entry = text, "skipping empty requirement"),
                Err(message) => {
                    return Err(ManifestError::toml_parse_error(
                        path,
                        format!("invalid dependency '{}' in '{}': {}", text, group, message),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl ManifestParser for PyprojectTomlParser {
    fn parse(&self, content: &str, path: &Path) -> Result<Vec<Dependency>, ManifestError> {
        let toml: Value = toml::from_str(content)
            .map_err(|e: toml::de::Error| ManifestError::toml_parse_error(path, e.to_string()))?;

        let mut dependencies = Vec::new();
        let project = toml.get("project");

        if let Some(deps) = project
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array())
        {
            Self::collect(deps, "dependencies", path, &mut dependencies)?;
        }

        if let Some(optional) = project
            .and_then(|p| p.get("optional-dependencies"))
            .and_then(|d| d.as_table())
        {
            for (group, deps) in optional {
                if let Some(deps) = deps.as_array() {
                    Self::collect(deps, group, path, &mut dependencies)?;
                }
            }
        }

        Ok(dependencies)
    }

    fn name(&self) -> &'static str {
        "pyproject.toml"
    }
}
