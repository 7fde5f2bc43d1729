//! Tracing subscriber setup for binaries embedding rulesmith

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a compact stdout subscriber filtered by `RUST_LOG`
/// (default `info`).
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_default("info")
}

/// Like [`init`], with `default_filter` used when `RUST_LOG` is unset.
pub fn init_with_default(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
