//! Version comparison for dependencies
//!
//! This module provides:
//! - PEP 440 parsing helpers and change-kind detection
//! - Release information from the index
//! - The judge that picks the latest release and classifies a dependency

mod release;
mod version;

pub use release::Release;
pub use version::{compare_versions, is_prerelease, parse_specifiers, parse_version, ChangeKind};

use crate::domain::{Dependency, VersionInfo, VersionStatus};
use crate::error::VersionError;
use pep508_rs::pep440_rs::{Operator, Version, VersionSpecifier, VersionSpecifiers};
use tracing::debug;

/// Classify a pinned version against the latest one
pub fn classify(declared: &Version, latest: &Version) -> VersionStatus {
    if latest > declared {
        VersionStatus::Outdated
    } else {
        VersionStatus::UpToDate
    }
}

/// Classify a specifier set against the latest version.
///
/// Up to date when the set admits the latest release, or when the latest
/// release only falls short of a lower bound. Outdated when an upper bound,
/// exclusion or prefix keeps the latest release out. Clause order is
/// irrelevant.
pub fn classify_specifiers(specifiers: &VersionSpecifiers, latest: &Version) -> VersionStatus {
    let held_back = specifiers
        .iter()
        .filter(|specifier| !specifier.contains(latest))
        .any(|specifier| !below_floor(specifier, latest));

    if held_back {
        VersionStatus::Outdated
    } else {
        VersionStatus::UpToDate
    }
}

/// True when the clause rejects `latest` only because it is too old
fn below_floor(specifier: &VersionSpecifier, latest: &Version) -> bool {
    let floor = matches!(
        specifier.operator(),
        Operator::Equal
            | Operator::EqualStar
            | Operator::ExactEqual
            | Operator::TildeEqual
            | Operator::GreaterThan
            | Operator::GreaterThanEqual
    );
    floor && latest <= specifier.version()
}

/// A dependency's constraint, parsed for comparison
enum Declared {
    Unconstrained,
    Pinned(Version),
    Specifiers(VersionSpecifiers),
    Invalid(VersionError),
}

impl Declared {
    fn of(dependency: &Dependency) -> Self {
        let Some(spec) = &dependency.constraint else {
            return Declared::Unconstrained;
        };
        let parsed = match spec.pinned_version() {
            Some(version) => parse_version(version).map(Declared::Pinned),
            None => parse_specifiers(&spec.raw).map(Declared::Specifiers),
        };
        parsed.unwrap_or_else(Declared::Invalid)
    }

    /// Pre-releases count when the constraint itself names one
    fn allows_prerelease(&self) -> bool {
        match self {
            Declared::Pinned(version) => is_prerelease(version),
            Declared::Specifiers(specifiers) => specifiers
                .iter()
                .any(|specifier| is_prerelease(specifier.version())),
            Declared::Unconstrained | Declared::Invalid(_) => false,
        }
    }
}

/// Judge that decides whether a dependency is outdated
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionJudge;

impl VersionJudge {
    pub fn new() -> Self {
        Self
    }

    /// Pick the latest release.
    ///
    /// Pre-releases are only candidates when `allow_prerelease` is set or when
    /// the index has nothing else. Versions that do not parse are skipped.
    pub fn latest<'a>(
        &self,
        package: &str,
        releases: &'a [Release],
        allow_prerelease: bool,
    ) -> Option<(Version, &'a Release)> {
        let parsed: Vec<(Version, &Release)> = releases
            .iter()
            .filter_map(|release| match parse_version(&release.version) {
                Ok(version) => Some((version, release)),
                Err(e) => {
                    debug!(package, error = %e, "skipping index version");
                    None
                }
            })
            .collect();

        let has_final = parsed.iter().any(|(v, _)| !is_prerelease(v));

        parsed
            .into_iter()
            .filter(|(v, _)| allow_prerelease || !has_final || !is_prerelease(v))
            .max_by(|(a, _), (b, _)| a.cmp(b))
    }

    /// Judge a dependency given the releases published on the index
    pub fn judge(&self, dependency: &Dependency, releases: &[Release]) -> VersionInfo {
        let declared = Declared::of(dependency);

        let Some((latest, release)) =
            self.latest(&dependency.name, releases, declared.allows_prerelease())
        else {
            return VersionInfo::new(
                dependency,
                VersionStatus::LookupFailed("no usable releases on the index".to_string()),
            );
        };

        let status = match &declared {
            Declared::Unconstrained => VersionStatus::Unconstrained,
            Declared::Invalid(e) => VersionStatus::Unparseable(e.to_string()),
            Declared::Pinned(current) => classify(current, &latest),
            Declared::Specifiers(specifiers) => classify_specifiers(specifiers, &latest),
        };

        debug!(
            package = %dependency.name,
            declared = %dependency.constraint.as_ref().map(|c| c.raw.as_str()).unwrap_or("-"),
            latest = %latest,
            status = status.label(),
            "judged dependency"
        );

        VersionInfo::new(dependency, status).with_latest(&release.version, release.released_at)
    }
}
