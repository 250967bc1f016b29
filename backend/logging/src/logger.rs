//! Structured Logger
//!
//! Wraps `tracing` to provide human-readable console output, JSON file
//! rotation (NDJSON), and environment-based level control.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "chatgate.log";

/// `RUST_LOG` wins over `level`; an unparsable `level` falls back to `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global structured logger.
///
/// Console goes to stderr so stdout stays free for bot replies; the file
/// layer writes `chatgate.log.YYYY-MM-DD` under `log_dir`.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) {
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Console-only logger for short-lived subcommands.
pub fn init_console_logger(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_falls_back() {
        // Must not panic whatever RUST_LOG holds.
        let _ = build_filter("not a [valid directive");
        let _ = build_filter("debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_console_logger("warn");
        init_console_logger("debug");
    }
}
