//! Check orchestrator for coordinating the entire workflow
//!
//! This module provides:
//! - Workflow coordination: locate → parse → fetch → judge → advisories
//! - Sequential index queries, one dependency at a time
//! - Per-dependency error capture so one failure never aborts the batch
//! - Fail-open security pass

use crate::check::{parse_version, VersionJudge};
use crate::config::{DependencySource, RunConfig};
use crate::domain::{Dependency, Report, SecurityCheck, VersionInfo, VersionStatus};
use crate::error::{AppError, ManifestError, RegistryError};
use crate::manifest::{locate_manifest, read_installed, read_manifest, PipLister};
use crate::progress::Progress;
use crate::registry::{HttpClient, PackageIndex, PyPIAdapter};
use crate::security::{AdvisorySource, OsvClient};
use tracing::{debug, info, warn};

/// Label used as report source when checking installed packages
pub const INSTALLED_SOURCE: &str = "installed packages";

/// Orchestrator for coordinating the check workflow
pub struct Orchestrator {
    config: RunConfig,
    index: Box<dyn PackageIndex>,
    /// Only set when the security pass is enabled
    advisories: Option<Box<dyn AdvisorySource>>,
    judge: VersionJudge,
}

impl Orchestrator {
    /// Create an orchestrator talking to the configured index and OSV endpoint
    pub fn new(config: RunConfig) -> Result<Self, AppError> {
        let client = HttpClient::new()?;

        let index: Box<dyn PackageIndex> =
            Box::new(PyPIAdapter::with_base_url(client.clone(), &config.index_url));
        let advisories: Option<Box<dyn AdvisorySource>> = if config.check_security {
            Some(Box::new(OsvClient::with_base_url(
                client,
                &config.advisory_url,
            )))
        } else {
            None
        };

        Ok(Self::with_sources(config, index, advisories))
    }

    /// Create an orchestrator with custom sources (for testing)
    pub fn with_sources(
        config: RunConfig,
        index: Box<dyn PackageIndex>,
        advisories: Option<Box<dyn AdvisorySource>>,
    ) -> Self {
        Self {
            config,
            index,
            advisories,
            judge: VersionJudge::new(),
        }
    }

    /// Run the whole workflow.
    ///
    /// Only manifest problems are fatal; everything after that is recorded
    /// in the report.
    pub async fn run(&self) -> Result<Report, AppError> {
        let (source, dependencies) = self.load_dependencies()?;
        Ok(self
            .check(source, &dependencies, self.config.show_progress)
            .await)
    }

    /// Read the dependencies to check, returning a label for their origin
    pub fn load_dependencies(&self) -> Result<(String, Vec<Dependency>), ManifestError> {
        match &self.config.source {
            DependencySource::Installed => {
                let lister = PipLister::new(&self.config.project_path);
                let dependencies = read_installed(&lister)?;
                Ok((INSTALLED_SOURCE.to_string(), dependencies))
            }
            DependencySource::Manifest(explicit) => {
                let manifest = locate_manifest(explicit.as_deref(), &self.config.project_path)?;
                let dependencies = read_manifest(&manifest)?;
                Ok((manifest.path.display().to_string(), dependencies))
            }
        }
    }

    /// Check dependencies against the index, then the advisory source if any
    pub async fn check(
        &self,
        source: impl Into<String>,
        dependencies: &[Dependency],
        show_progress: bool,
    ) -> Report {
        let mut report = Report::new(source);
        let mut progress = Progress::new(show_progress);

        info!(
            source = %report.source,
            count = dependencies.len(),
            index = self.index.registry_name(),
            "checking dependencies"
        );

        progress.start(dependencies.len() as u64, "Checking dependencies");
        for dependency in dependencies {
            progress.set_message(&format!("Checking {}", dependency.name));
            report.push(self.check_one(dependency).await);
            progress.inc();
        }
        progress.finish_and_clear();

        if let Some(advisories) = &self.advisories {
            report.security = self
                .check_advisories(advisories.as_ref(), &mut report.entries, &mut progress)
                .await;
        }

        report
    }

    /// Fetch and judge a single dependency
    async fn check_one(&self, dependency: &Dependency) -> VersionInfo {
        match self.index.fetch_releases(&dependency.name).await {
            Ok(releases) => self.judge.judge(dependency, &releases),
            Err(e) => {
                warn!(package = %dependency.name, error = %e, "index lookup failed");
                VersionInfo::new(dependency, Self::failure_status(&e))
            }
        }
    }

    fn failure_status(error: &RegistryError) -> VersionStatus {
        if error.is_lookup_failure() {
            VersionStatus::LookupFailed(error.to_string())
        } else {
            VersionStatus::NetworkFailed(error.to_string())
        }
    }

    /// Attach advisories to every entry pinned to a parseable version.
    ///
    /// Ranges, bounds and exclusions are not scanned.
    ///
    /// The first failure stops the pass and marks the check unavailable.
    async fn check_advisories(
        &self,
        advisories: &dyn AdvisorySource,
        entries: &mut [VersionInfo],
        progress: &mut Progress,
    ) -> SecurityCheck {
        let eligible: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry
                    .declared_version
                    .as_deref()
                    .is_some_and(|v| parse_version(v).is_ok())
            })
            .map(|(i, _)| i)
            .collect();

        progress.start(eligible.len() as u64, "Checking advisories");
        let mut outcome = SecurityCheck::Completed;

        for i in eligible {
            let entry = &mut entries[i];
            let Some(version) = entry.declared_version.clone() else {
                continue;
            };
            progress.set_message(&format!("Checking {}", entry.name));

            match advisories.advisories(&entry.name, &version).await {
                Ok(found) => {
                    if !found.is_empty() {
                        debug!(package = %entry.name, count = found.len(), "advisories found");
                    }
                    entry.vulnerabilities = found;
                }
                Err(e) => {
                    warn!(
                        source = advisories.source_name(),
                        error = %e,
                        "continuing without security check"
                    );
                    outcome = SecurityCheck::Unavailable(e.to_string());
                    break;
                }
            }
            progress.inc();
        }

        progress.finish_and_clear();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Release;
    use crate::domain::{Advisory, Severity, VersionSpec, VersionSpecKind};
    use crate::error::AdvisoryError;
    use crate::output::OutputConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StubIndex {
        releases: HashMap<String, Vec<Release>>,
        offline: Vec<String>,
    }

    impl StubIndex {
        fn new(entries: &[(&str, &[&str])]) -> Self {
            let releases = entries
                .iter()
                .map(|(name, versions)| {
                    let releases = versions.iter().map(|v| Release::undated(*v)).collect();
                    (name.to_string(), releases)
                })
                .collect();
            Self {
                releases,
                offline: Vec::new(),
            }
        }

        fn offline_for(mut self, name: &str) -> Self {
            self.offline.push(name.to_string());
            self
        }
    }

    #[async_trait]
    impl PackageIndex for StubIndex {
        fn registry_name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_releases(&self, package: &str) -> Result<Vec<Release>, RegistryError> {
            if self.offline.iter().any(|p| p == package) {
                return Err(RegistryError::network_error(package, "stub", "connection refused"));
            }
            self.releases
                .get(package)
                .cloned()
                .ok_or_else(|| RegistryError::package_not_found(package, "stub"))
        }
    }

    struct StubAdvisories {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl AdvisorySource for StubAdvisories {
        fn source_name(&self) -> &'static str {
            "stub-osv"
        }

        async fn advisories(
            &self,
            package: &str,
            version: &str,
        ) -> Result<Vec<Advisory>, AdvisoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AdvisoryError::unavailable("stub-osv", "service down"));
            }
            if package == "requests" && version == "2.25.0" {
                return Ok(vec![Advisory::new(
                    "PYSEC-2023-74",
                    Severity::Medium,
                    "Unintended leak of Proxy-Authorization header",
                )
                .with_aliases(vec!["CVE-2023-32681".to_string()])
                .with_fixed_version("2.31.0")]);
            }
            Ok(Vec::new())
        }
    }

    fn run_config(source: DependencySource, project_path: PathBuf) -> RunConfig {
        RunConfig {
            source,
            project_path,
            check_security: false,
            index_url: "http://127.0.0.1:1".to_string(),
            advisory_url: "http://127.0.0.1:1".to_string(),
            output: OutputConfig::default(),
            show_progress: false,
        }
    }

    fn orchestrator(
        index: StubIndex,
        advisories: Option<StubAdvisories>,
    ) -> Orchestrator {
        Orchestrator::with_sources(
            run_config(DependencySource::Manifest(None), PathBuf::from(".")),
            Box::new(index),
            advisories.map(|a| Box::new(a) as Box<dyn AdvisorySource>),
        )
    }

    fn pypi_like() -> StubIndex {
        StubIndex::new(&[
            ("requests", &["2.24.0", "2.25.0", "2.31.0"]),
            ("numpy", &["1.25.0", "1.26.0"]),
        ])
    }

    #[tokio::test]
    async fn test_check_outdated_and_up_to_date() {
        let deps = vec![
            Dependency::pinned("requests", "2.25.0"),
            Dependency::pinned("numpy", "99.0.0"),
        ];
        let report = orchestrator(pypi_like(), None)
            .check("requirements.txt", &deps, false)
            .await;

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].status, VersionStatus::Outdated);
        assert_eq!(report.entries[0].recommended_version(), Some("2.31.0"));
        assert_eq!(report.entries[1].status, VersionStatus::UpToDate);
        assert_eq!(report.security, SecurityCheck::NotRequested);
    }

    #[tokio::test]
    async fn test_check_empty_manifest() {
        let report = orchestrator(pypi_like(), None)
            .check("requirements.txt", &[], false)
            .await;
        assert!(report.is_empty());
        assert_eq!(report.summary().total, 0);
    }

    #[tokio::test]
    async fn test_unknown_package_does_not_abort_batch() {
        let deps = vec![
            Dependency::pinned("no-such-package-xyz", "1.0"),
            Dependency::pinned("requests", "2.25.0"),
        ];
        let report = orchestrator(pypi_like(), None)
            .check("requirements.txt", &deps, false)
            .await;

        assert!(matches!(
            report.entries[0].status,
            VersionStatus::LookupFailed(_)
        ));
        assert_eq!(report.entries[1].status, VersionStatus::Outdated);
    }

    #[tokio::test]
    async fn test_network_failure_is_recorded() {
        let deps = vec![Dependency::pinned("numpy", "1.25.0")];
        let report = orchestrator(pypi_like().offline_for("numpy"), None)
            .check("requirements.txt", &deps, false)
            .await;

        match &report.entries[0].status {
            VersionStatus::NetworkFailed(reason) => assert!(reason.contains("connection refused")),
            other => panic!("unexpected status: {other}"),
        }
    }

    #[tokio::test]
    async fn test_manifest_order_is_preserved() {
        let deps = vec![
            Dependency::unconstrained("numpy"),
            Dependency::pinned("missing", "1"),
            Dependency::pinned("requests", "2.31.0"),
        ];
        let report = orchestrator(pypi_like(), None)
            .check("requirements.txt", &deps, false)
            .await;
        let names: Vec<_> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["numpy", "missing", "requests"]);
        assert_eq!(report.entries[0].status, VersionStatus::Unconstrained);
    }

    #[tokio::test]
    async fn test_security_pass_attaches_advisories() {
        let calls = Arc::new(AtomicUsize::new(0));
        let advisories = StubAdvisories {
            calls: calls.clone(),
            fail: false,
        };
        let deps = vec![
            Dependency::pinned("requests", "2.25.0"),
            Dependency::pinned("numpy", "1.26.0"),
            Dependency::unconstrained("flask"),
        ];
        let report = orchestrator(pypi_like(), Some(advisories))
            .check("requirements.txt", &deps, false)
            .await;

        assert_eq!(report.security, SecurityCheck::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.entries[0].vulnerabilities.len(), 1);
        assert_eq!(
            report.entries[0].vulnerabilities[0].display_id(),
            "CVE-2023-32681"
        );
        assert!(report.entries[1].vulnerabilities.is_empty());
        assert_eq!(report.summary().vulnerable, 1);
    }

    #[tokio::test]
    async fn test_security_pass_skips_unpinned_constraints() {
        let calls = Arc::new(AtomicUsize::new(0));
        let advisories = StubAdvisories {
            calls: calls.clone(),
            fail: false,
        };
        let exclusion = VersionSpec::new(VersionSpecKind::NotEqual, "!=2.25.0");
        let floor = VersionSpec::new(VersionSpecKind::GreaterOrEqual, ">=1.0");
        let deps = vec![
            Dependency::new("requests", Some(exclusion)),
            Dependency::new("numpy", Some(floor)),
        ];
        let report = orchestrator(pypi_like(), Some(advisories))
            .check("requirements.txt", &deps, false)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.security, SecurityCheck::Completed);
        assert!(!report.entries[0].is_vulnerable());
        assert_eq!(report.entries[0].status, VersionStatus::UpToDate);
    }

    #[tokio::test]
    async fn test_without_security_no_advisory_queried() {
        let deps = vec![Dependency::pinned("requests", "2.25.0")];
        let report = orchestrator(pypi_like(), None)
            .check("requirements.txt", &deps, false)
            .await;
        assert!(!report.entries[0].is_vulnerable());
        assert!(!report.security.was_requested());
    }

    #[tokio::test]
    async fn test_security_unavailable_fails_open() {
        let calls = Arc::new(AtomicUsize::new(0));
        let advisories = StubAdvisories {
            calls: calls.clone(),
            fail: true,
        };
        let deps = vec![
            Dependency::pinned("requests", "2.25.0"),
            Dependency::pinned("numpy", "1.26.0"),
        ];
        let report = orchestrator(pypi_like(), Some(advisories))
            .check("requirements.txt", &deps, false)
            .await;

        assert!(matches!(report.security, SecurityCheck::Unavailable(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.entries[0].status, VersionStatus::Outdated);
        assert_eq!(report.entries[1].status, VersionStatus::UpToDate);
    }

    #[tokio::test]
    async fn test_run_reads_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("requirements.txt"),
            "requests==2.25.0\nnumpy==99.0.0\n",
        )
        .unwrap();

        let orchestrator = Orchestrator::with_sources(
            run_config(DependencySource::Manifest(None), dir.path().to_path_buf()),
            Box::new(pypi_like()),
            None,
        );
        let report = orchestrator.run().await.unwrap();
        assert!(report.source.ends_with("requirements.txt"));
        assert_eq!(report.outdated().count(), 1);
    }

    #[tokio::test]
    async fn test_run_missing_manifest_is_fatal() {
        let dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::with_sources(
            run_config(DependencySource::Manifest(None), dir.path().to_path_buf()),
            Box::new(pypi_like()),
            None,
        );
        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, AppError::Manifest(ManifestError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_run_malformed_manifest_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reqs.txt");
        fs::write(&path, "requests=>2\n").unwrap();

        let orchestrator = Orchestrator::with_sources(
            run_config(DependencySource::Manifest(Some(path)), dir.path().to_path_buf()),
            Box::new(pypi_like()),
            None,
        );
        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, AppError::Manifest(ManifestError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_new_without_security_has_no_advisory_source() {
        let config = run_config(DependencySource::Manifest(None), PathBuf::from("."));
        let orchestrator = Orchestrator::new(config).unwrap();
        assert!(orchestrator.advisories.is_none());
        assert_eq!(orchestrator.index.registry_name(), "PyPI");
    }

    #[test]
    fn test_new_with_security_has_advisory_source() {
        let mut config = run_config(DependencySource::Manifest(None), PathBuf::from("."));
        config.check_security = true;
        let orchestrator = Orchestrator::new(config).unwrap();
        assert_eq!(
            orchestrator.advisories.as_ref().map(|a| a.source_name()),
            Some("OSV.dev")
        );
    }
}
