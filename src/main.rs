//! pipstale - Python dependency staleness checker CLI tool
//!
//! Reads requirements.txt, pyproject.toml or the installed packages, asks
//! PyPI for the latest releases and reports what is outdated.

use clap::Parser;
use pipstale::cli::CliArgs;
use pipstale::config::RunConfig;
use pipstale::logging::init_logging;
use pipstale::orchestrator::Orchestrator;
use pipstale::output::create_formatter;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::from_cli(&args, io::stdout().is_terminal());
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        project = %config.project_path.display(),
        "starting"
    );

    let orchestrator = Orchestrator::new(config.clone())?;
    let report = orchestrator.run().await?;

    let formatter = create_formatter(&config.output);
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    // Findings are reported, not treated as failure
    Ok(ExitCode::SUCCESS)
}
