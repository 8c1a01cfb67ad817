//! Logging setup shared by the Hookcast binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The default filter enables `default_log_level` for the calling crate and
/// for the binary itself. `RUST_LOG` overrides it entirely.
///
/// # Arguments
///
/// * `crate_name` - The package name of the caller (`env!("CARGO_PKG_NAME")`)
/// * `binary_name` - The name of the binary (`env!("CARGO_BIN_NAME")`)
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use hookcast_shared::logger::setup_logger;
///
/// setup_logger("hookcast-server", "hookcast-server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(crate_name, binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(crate_name: &str, binary_name: &str, level: &str) -> String {
    format!(
        "{}={level},{}={level},tower_http={level}",
        crate_name.replace('-', "_"),
        binary_name.replace('-', "_"),
    )
}
