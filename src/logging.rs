//! Diagnostic logging setup
//!
//! Diagnostics go to stderr through `tracing`. The durable change history is
//! the audit log, not this.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding a full filter directive
pub const LOG_ENV: &str = "SPENDLENS_LOG";

/// Filter directive for a `-v` count, if any was given
fn verbosity_level(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Choose the filter: `SPENDLENS_LOG`, then `-v`, then the settings level
fn select_directive(env: Option<String>, verbosity: u8, settings_level: &str) -> String {
    env.filter(|value| !value.trim().is_empty())
        .or_else(|| verbosity_level(verbosity).map(str::to_string))
        .unwrap_or_else(|| settings_level.trim().to_lowercase())
}

/// Install the global subscriber
///
/// Calling this twice leaves the first subscriber in place.
pub fn init_logging(verbosity: u8, settings_level: &str) {
    let directive = select_directive(std::env::var(LOG_ENV).ok(), verbosity, settings_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(filter = %directive, "logging initialised");
    }
}
