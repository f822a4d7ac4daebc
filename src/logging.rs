//! Logging configuration
//!
//! Diagnostics go to stderr so stdout only carries the report.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level implied by the verbosity flags
pub fn level_for(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Directive applied when `RUST_LOG` is not set
pub fn default_directive(verbose: bool, quiet: bool) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), level_for(verbose, quiet))
}

/// Initialize tracing; `RUST_LOG` overrides the flags
pub fn init_logging(verbose: bool, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()?;

    Ok(())
}
