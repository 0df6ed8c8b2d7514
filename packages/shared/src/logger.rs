//! Logger setup shared by the server binary and test harnesses.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise `default_level` applies to the
/// application crate and `info` to everything else.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn setup_logger(app_name: &str, default_level: &str) {
    let crate_target = app_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,{crate_target}={default_level},chattrix_server={default_level},tower_http=debug"
        ))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
