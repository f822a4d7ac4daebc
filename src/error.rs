//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: reading or parsing the dependency manifest (fatal)
//! - RegistryError: package index communication (recorded per dependency)
//! - VersionError: malformed version strings (recorded per dependency)
//! - AdvisoryError: vulnerability database unavailable (warning only)

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type for failures that abort the run
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package index related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed requirement line
    #[error("failed to parse {path} at line {line} ('{content}'): {message}")]
    ParseError {
        path: PathBuf,
        line: usize,
        content: String,
        message: String,
    },

    /// TOML parsing error (for pyproject.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// Listing installed packages through pip failed
    #[error("failed to list installed packages with '{command}': {message}")]
    InstalledListError { command: String, message: String },
}

/// Errors related to package index communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in the index
    #[error("package '{package}' not found in {registry}")]
    PackageNotFound { package: String, registry: String },

    /// Package exists but has no installable release
    #[error("package '{package}' has no usable releases on {registry}")]
    NoReleases { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry}")]
    RateLimitExceeded { registry: String },

    /// Invalid response from the index
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to version strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The version string is not a valid PEP 440 version
    #[error("invalid version '{version}': {message}")]
    Unparseable { version: String, message: String },
}

/// Errors related to the vulnerability database
#[derive(Error, Debug)]
pub enum AdvisoryError {
    /// The advisory service could not be queried
    #[error("security check unavailable ({source_name}): {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError for a single line
    pub fn parse_error(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::ParseError {
            path: path.into(),
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InstalledListError
    pub fn installed_list_error(command: impl Into<String>, message: impl Into<String>) -> Self {
        ManifestError::InstalledListError {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NoReleases error
    pub fn no_releases(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::NoReleases {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Returns true if the index answered but does not know the package
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            RegistryError::PackageNotFound { .. } | RegistryError::NoReleases { .. }
        )
    }
}

impl VersionError {
    /// Creates a new Unparseable error
    pub fn unparseable(version: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::Unparseable {
            version: version.into(),
            message: message.into(),
        }
    }
}

impl AdvisoryError {
    /// Creates a new Unavailable error
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AdvisoryError::Unavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
