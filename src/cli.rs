//! CLI argument parsing module for pipstale

use clap::Parser;
use std::path::PathBuf;

use crate::registry::DEFAULT_INDEX_URL;
use crate::security::DEFAULT_ADVISORY_URL;

/// Report outdated and vulnerable Python dependencies
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pipstale",
    version,
    about = "Report outdated and vulnerable Python dependencies"
)]
pub struct CliArgs {
    /// Requirements file to check (default: requirements.txt or pyproject.toml in the project)
    #[arg(short = 'r', long, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Project directory
    #[arg(short = 'p', long, default_value = ".", value_name = "DIR")]
    pub project_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Look up known vulnerabilities for declared versions
    #[arg(long)]
    pub check_security: bool,

    /// Check packages installed in the environment (pip list) instead of a manifest
    #[arg(long, conflicts_with = "requirements")]
    pub installed: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    // Service endpoints
    /// Base URL of the package index JSON API
    #[arg(long, default_value = DEFAULT_INDEX_URL, value_name = "URL")]
    pub index_url: String,

    /// Base URL of the OSV vulnerability API
    #[arg(long, default_value = DEFAULT_ADVISORY_URL, value_name = "URL")]
    pub advisory_url: String,
}
