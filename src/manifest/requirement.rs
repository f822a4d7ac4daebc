//! PEP 508 requirement string parser
//!
//! Handles requirement formats:
//! - Exact: `requests==2.25.0`
//! - Comparison: `numpy>=1.20`, `django<5`, `six!=1.0`
//! - Compatible release: `attrs~=21.4`
//! - Wildcard: `flask==2.*`
//! - Range: `urllib3>=1.21,<3`
//! - Extras and markers: `requests[socks]==2.25.0; python_version >= "3.8"`
//! - Direct references: `pkg @ https://...` (no version constraint)
//!
//! Lines are parsed with `pep508_rs`. A line it rejects is still accepted when
//! every clause has a known operator and only a version is malformed, so the
//! bad version is reported on its own dependency later.

use crate::domain::{Dependency, VersionSpec, VersionSpecKind};
use pep508_rs::pep440_rs::{Operator, Version, VersionSpecifier, VersionSpecifiers};
use pep508_rs::{Requirement, VerbatimUrl, VersionOrUrl};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

// PEP 508 name, optional extras, remainder
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9](?:[-a-zA-Z0-9._]*[a-zA-Z0-9])?)\s*(?:\[([^\]]*)\])?\s*(.*)$")
        .unwrap()
});
// One specifier clause: operator and version text
static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(===|==|~=|!=|<=|>=|<|>)\s*([^\s,;]+)$").unwrap());

/// Parse one requirement string.
///
/// Returns `Ok(None)` when nothing is left after dropping the marker, and an
/// error message describing the first problem otherwise.
pub fn parse_requirement(text: &str) -> Result<Option<Dependency>, String> {
    let text = text.trim();
    let without_marker = text.split(';').next().unwrap_or("").trim();
    if without_marker.is_empty() {
        return Ok(None);
    }

    let requirement = match Requirement::<VerbatimUrl>::from_str(text) {
        Ok(requirement) => requirement,
        Err(e) => {
            let message = e.message.to_string();
            let message = message.lines().next().unwrap_or_default().to_string();
            return malformed_versions(without_marker)
                .map(Some)
                .ok_or(message);
        }
    };

    // PackageName is normalized; keep the manifest spelling for display
    let name = REQUIREMENT_RE
        .captures(without_marker)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| requirement.name.to_string());

    let constraint = match &requirement.version_or_url {
        Some(VersionOrUrl::VersionSpecifier(specifiers)) if !specifiers.is_empty() => {
            Some(spec_from_specifiers(specifiers))
        }
        _ => None,
    };

    Ok(Some(Dependency::new(name, constraint)))
}

/// Build a `VersionSpec` from a parsed specifier set
fn spec_from_specifiers(specifiers: &VersionSpecifiers) -> VersionSpec {
    let raw = specifiers
        .iter()
        .map(VersionSpecifier::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let kind = match &specifiers[..] {
        [single] => kind_of(single.operator()),
        _ => VersionSpecKind::Range,
    };

    VersionSpec::new(kind, raw)
}

fn kind_of(operator: &Operator) -> VersionSpecKind {
    match operator {
        Operator::Equal => VersionSpecKind::Exact,
        Operator::EqualStar => VersionSpecKind::Wildcard,
        Operator::ExactEqual => VersionSpecKind::ArbitraryEqual,
        Operator::NotEqual | Operator::NotEqualStar => VersionSpecKind::NotEqual,
        Operator::TildeEqual => VersionSpecKind::Compatible,
        Operator::LessThan => VersionSpecKind::Less,
        Operator::LessThanEqual => VersionSpecKind::LessOrEqual,
        Operator::GreaterThan => VersionSpecKind::Greater,
        Operator::GreaterThanEqual => VersionSpecKind::GreaterOrEqual,
    }
}

/// Accept a line whose clauses are well formed but carry an invalid version.
///
/// Returns `None` when the shape itself is wrong, or when every version
/// parses (the line was rejected for another reason).
fn malformed_versions(text: &str) -> Option<Dependency> {
    let caps = REQUIREMENT_RE.captures(text)?;
    let name = caps.get(1)?.as_str();
    let rest = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
    let rest = rest
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(rest);

    let mut clauses = Vec::new();
    for clause in rest.split(',') {
        let caps = CLAUSE_RE.captures(clause.trim())?;
        let operator = caps.get(1)?.as_str();
        let version = caps.get(2)?.as_str();
        let wildcard = version.ends_with(".*");
        if wildcard && operator != "==" && operator != "!=" {
            return None;
        }
        let kind = VersionSpecKind::from_operator(operator, wildcard)?;
        clauses.push((kind, operator, version));
    }

    let any_invalid = clauses.iter().any(|(_, _, version)| {
        Version::from_str(version.strip_suffix(".*").unwrap_or(version)).is_err()
    });
    if !any_invalid {
        return None;
    }

    let kind = match clauses.as_slice() {
        [(kind, _, _)] => *kind,
        _ => VersionSpecKind::Range,
    };
    let raw = clauses
        .iter()
        .map(|(_, op, v)| format!("{}{}", op, v))
        .collect::<Vec<_>>()
        .join(",");

    Some(Dependency::new(name, Some(VersionSpec::new(kind, raw))))
}
