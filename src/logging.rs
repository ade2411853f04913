//! Diagnostics setup.
//!
//! Standard output carries the response payload, so logs go to standard
//! error without colors.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Host environment flag set while the workflow debugger is open.
pub const DEBUG_ENV: &str = "alfred_debug";

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(std::env::var(DEBUG_ENV).ok().as_deref())))
}

fn default_level(debug_flag: Option<&str>) -> &'static str {
    match debug_flag {
        Some("1") => "debug",
        _ => "warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(Some("1")), "debug");
        assert_eq!(default_level(Some("0")), "warn");
        assert_eq!(default_level(None), "warn");
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
    }
}
