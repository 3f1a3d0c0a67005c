//! Logging setup for association hydration.
//!
//! Hydration emits `tracing` events under the `prax_hydrate_core` target. This
//! module installs a subscriber for applications that do not configure their
//! own, controlled by environment variables.
//!
//! # Environment Variables
//!
//! - `PRAX_HYDRATE_DEBUG=true|1|yes` - Enable debug logging
//! - `PRAX_HYDRATE_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `PRAX_HYDRATE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! ```rust,no_run
//! use prax_hydrate_core::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `PRAX_HYDRATE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("PRAX_HYDRATE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `PRAX_HYDRATE_LOG_LEVEL`.
///
/// Defaults to "debug" if `PRAX_HYDRATE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("PRAX_HYDRATE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `PRAX_HYDRATE_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("PRAX_HYDRATE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the logging system.
///
/// Subsequent calls are no-ops. Without the `tracing-subscriber` feature this
/// does nothing and events go to whatever subscriber the application installs.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("PRAX_HYDRATE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "prax_hydrate={},prax_hydrate_core={}",
                level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Hydration logging initialized"
                );
            }
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early, before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var("PRAX_HYDRATE_LOG_LEVEL", level);
    }
    init();
}

/// Initialize debug logging (equivalent to `PRAX_HYDRATE_DEBUG=true` + [`init`]).
///
/// # Safety
///
/// Same constraints as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var("PRAX_HYDRATE_DEBUG", "true");
    }
    init();
}
