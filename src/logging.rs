//! Logging setup
//!
//! Logs go to stderr so stdout stays free for the summary and `--json`
//! output. The level defaults to `warn`, `--verbose` raises it to `debug`,
//! and `RUST_LOG` overrides both.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(console::colors_enabled_stderr());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(default_filter(true), "debug");
    }

    #[test]
    #[serial]
    fn test_init_logging_twice() {
        init_logging(false);
        init_logging(true);
    }
}
