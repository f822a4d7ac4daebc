//! Run configuration resolved from command line arguments

use crate::cli::CliArgs;
use crate::output::OutputConfig;
use std::path::PathBuf;

/// Where the dependencies to check come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// Locate a manifest, optionally at an explicit path
    Manifest(Option<PathBuf>),
    /// Packages installed in the environment
    Installed,
}

/// Everything a run needs, decoupled from clap
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DependencySource,
    /// Project directory used for manifest lookup and `pip list --path`
    pub project_path: PathBuf,
    pub check_security: bool,
    /// Package index base URL
    pub index_url: String,
    /// OSV API base URL
    pub advisory_url: String,
    pub output: OutputConfig,
    /// Draw progress bars on stderr
    pub show_progress: bool,
}

impl RunConfig {
    /// Create configuration from CLI arguments.
    ///
    /// `stdout_is_terminal` turns colors off when output is piped.
    pub fn from_cli(args: &CliArgs, stdout_is_terminal: bool) -> Self {
        let source = if args.installed {
            DependencySource::Installed
        } else {
            DependencySource::Manifest(args.requirements.clone())
        };

        let output = OutputConfig::from_cli(
            args.json,
            args.verbose,
            args.quiet,
            !args.no_color && stdout_is_terminal,
        );

        Self {
            source,
            project_path: args.project_path.clone(),
            check_security: args.check_security,
            index_url: args.index_url.clone(),
            advisory_url: args.advisory_url.clone(),
            output,
            show_progress: !args.quiet && !args.json,
        }
    }
}
