//! OSV.dev advisory adapter
//!
//! API endpoint: {base}/v1/query with ecosystem `PyPI`

use crate::domain::{Advisory, Severity};
use crate::error::AdvisoryError;
use crate::registry::HttpClient;
use crate::security::AdvisorySource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Public OSV API base URL
pub const DEFAULT_ADVISORY_URL: &str = "https://api.osv.dev";

const ECOSYSTEM: &str = "PyPI";

/// OSV.dev client
pub struct OsvClient {
    client: HttpClient,
    base_url: String,
}

#[derive(Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
    version: &'a str,
}

#[derive(Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Deserialize)]
struct OsvResponse {
    #[serde(default)]
    vulns: Vec<OsvVuln>,
}

#[derive(Deserialize)]
struct OsvVuln {
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
    summary: Option<String>,
    details: Option<String>,
    severity: Option<Vec<OsvSeverity>>,
    affected: Option<Vec<OsvAffected>>,
    references: Option<Vec<OsvReference>>,
    database_specific: Option<OsvDatabaseSpecific>,
}

#[derive(Deserialize)]
struct OsvSeverity {
    score: Option<String>,
}

#[derive(Deserialize)]
struct OsvAffected {
    ranges: Option<Vec<OsvRange>>,
}

#[derive(Deserialize)]
struct OsvRange {
    events: Option<Vec<OsvEvent>>,
}

#[derive(Deserialize)]
struct OsvEvent {
    fixed: Option<String>,
}

#[derive(Deserialize)]
struct OsvReference {
    url: Option<String>,
}

#[derive(Deserialize)]
struct OsvDatabaseSpecific {
    severity: Option<String>,
}

impl OsvClient {
    /// Create a client for the public OSV API
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_ADVISORY_URL)
    }

    /// Create a client for another OSV-compatible endpoint
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn query_url(&self) -> String {
        format!("{}/v1/query", self.base_url)
    }
}

#[async_trait]
impl AdvisorySource for OsvClient {
    fn source_name(&self) -> &'static str {
        "OSV.dev"
    }

    async fn advisories(
        &self,
        package: &str,
        version: &str,
    ) -> Result<Vec<Advisory>, AdvisoryError> {
        let query = OsvQuery {
            package: OsvPackage {
                name: package,
                ecosystem: ECOSYSTEM,
            },
            version,
        };

        let response: OsvResponse = self
            .client
            .post_json(&self.query_url(), &query, package, self.source_name())
            .await
            .map_err(|e| AdvisoryError::unavailable(self.source_name(), e.to_string()))?;

        debug!(package, version, count = response.vulns.len(), "queried advisories");

        Ok(response.vulns.into_iter().map(to_advisory).collect())
    }
}

fn to_advisory(vuln: OsvVuln) -> Advisory {
    let severity = parse_severity(&vuln);
    let fixed_version = extract_fixed_version(&vuln);
    let reference_url = vuln
        .references
        .and_then(|refs| refs.into_iter().find_map(|r| r.url));
    let description = vuln
        .summary
        .filter(|s| !s.trim().is_empty())
        .or(vuln.details)
        .unwrap_or_else(|| "No description available".to_string());

    let mut advisory = Advisory::new(vuln.id, severity, description).with_aliases(vuln.aliases);
    if let Some(fixed) = fixed_version {
        advisory = advisory.with_fixed_version(fixed);
    }
    if let Some(url) = reference_url {
        advisory = advisory.with_reference_url(url);
    }
    advisory
}

/// Parses CVSS score into a severity level.
///
/// Accepts a numeric base score or a CVSS 3.x vector, whose base score is
/// computed. Other vectors (CVSS 2, CVSS 4) yield `Unknown` so a database
/// severity label can take over.
pub fn parse_cvss_score(score: &str) -> Severity {
    let base = match score.trim().parse::<f64>() {
        Ok(base) => Some(base),
        Err(_) => cvss3_base_score(score.trim()),
    };

    match base {
        Some(s) if s >= 9.0 => Severity::Critical,
        Some(s) if s >= 7.0 => Severity::High,
        Some(s) if s >= 4.0 => Severity::Medium,
        Some(s) if s > 0.0 => Severity::Low,
        _ => Severity::Unknown,
    }
}

/// Base score of a `CVSS:3.0/...` or `CVSS:3.1/...` vector
fn cvss3_base_score(vector: &str) -> Option<f64> {
    let metrics = vector
        .strip_prefix("CVSS:3.1/")
        .or_else(|| vector.strip_prefix("CVSS:3.0/"))?;
    let metric = |name: &str| {
        metrics
            .split('/')
            .filter_map(|part| part.split_once(':'))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    };

    let changed = match metric("S")? {
        "U" => false,
        "C" => true,
        _ => return None,
    };
    let attack_vector = match metric("AV")? {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };
    let attack_complexity = match metric("AC")? {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };
    let privileges = match (metric("PR")?, changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.5,
        _ => return None,
    };
    let interaction = match metric("UI")? {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };
    let impact_of = |name: &str| match metric(name)? {
        "H" => Some(0.56),
        "L" => Some(0.22),
        "N" => Some(0.0),
        _ => None,
    };
    let (c, i, a) = (impact_of("C")?, impact_of("I")?, impact_of("A")?);

    let iss: f64 = 1.0 - (1.0 - c) * (1.0 - i) * (1.0 - a);
    let impact = if changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15)
    } else {
        6.42 * iss
    };
    if impact <= 0.0 {
        return Some(0.0);
    }

    let exploitability = 8.22 * attack_vector * attack_complexity * privileges * interaction;
    let base = if changed {
        (1.08 * (impact + exploitability)).min(10.0)
    } else {
        (impact + exploitability).min(10.0)
    };
    Some(round_up(base))
}

/// CVSS 3.1 round-up to one decimal
fn round_up(value: f64) -> f64 {
    let scaled = (value * 100_000.0).round() as i64;
    if scaled % 10_000 == 0 {
        scaled as f64 / 100_000.0
    } else {
        ((scaled / 10_000) + 1) as f64 / 10.0
    }
}

/// Map a GitHub-style severity label
fn parse_severity_label(label: &str) -> Severity {
    match label.to_ascii_uppercase().as_str() {
        "CRITICAL" => Severity::Critical,
        "HIGH" => Severity::High,
        "MODERATE" | "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        _ => Severity::Unknown,
    }
}

fn parse_severity(vuln: &OsvVuln) -> Severity {
    if let Some(severities) = &vuln.severity {
        for sev in severities {
            if let Some(score) = &sev.score {
                let severity = parse_cvss_score(score);
                if severity != Severity::Unknown {
                    return severity;
                }
            }
        }
    }

    vuln.database_specific
        .as_ref()
        .and_then(|db| db.severity.as_deref())
        .map(parse_severity_label)
        .unwrap_or(Severity::Unknown)
}

fn extract_fixed_version(vuln: &OsvVuln) -> Option<String> {
    vuln.affected.as_ref()?.iter().find_map(|affected| {
        affected.ranges.as_ref()?.iter().find_map(|range| {
            range
                .events
                .as_ref()?
                .iter()
                .find_map(|event| event.fixed.clone())
        })
    })
}
