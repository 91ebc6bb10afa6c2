//! Tracing subscriber setup.
//!
//! Outside production the filter comes from `RUST_LOG`, defaulting to
//! `debug`. In production diagnostic output is switched off entirely.

use fetchkit_core::AppEnv;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_directive(env: AppEnv) -> &'static str {
    if env.logging_enabled() { "debug" } else { "off" }
}

/// Build the filter for `env`
#[must_use]
pub fn filter_for(env: AppEnv) -> EnvFilter {
    if env.logging_enabled() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(env)))
    } else {
        EnvFilter::new(default_directive(env))
    }
}

/// Install a global fmt subscriber for `env`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(env: AppEnv) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(env))
        .with_target(true)
        .try_init()
}
