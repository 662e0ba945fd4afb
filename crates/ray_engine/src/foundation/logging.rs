//! Logging utilities and the process-wide verbosity level
//!
//! The engine reports through the `log` facade. The numeric verbosity level is
//! read from [`LOG_LEVEL_ENV`] (or supplied by a [`DeviceConfig`]) exactly once
//! per process; every later device observes the same value.
//!
//! [`DeviceConfig`]: crate::config::DeviceConfig

use log::LevelFilter;
use std::sync::OnceLock;

pub use log::{debug, info, warn, error, trace};

/// Environment variable holding the numeric verbosity level
pub const LOG_LEVEL_ENV: &str = "RAY_ENGINE_LOG_LEVEL";

/// Highest meaningful verbosity level
pub const MAX_VERBOSITY: u32 = 3;

static VERBOSITY: OnceLock<u32> = OnceLock::new();

/// Initialize the logging system
///
/// Installs `env_logger` with a default filter derived from [`verbosity`];
/// `RUST_LOG` still takes precedence. Calling this more than once is harmless.
pub fn init() {
    let _ = env_logger::Builder::new()
        .filter_level(level_filter(verbosity()))
        .parse_default_env()
        .try_init();
}

/// Parse a raw verbosity value, defaulting to 0 when absent or unparseable
pub fn parse_verbosity(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .map_or(0, |level| level.min(MAX_VERBOSITY))
}

/// Read the verbosity level from [`LOG_LEVEL_ENV`]
pub fn verbosity_from_env() -> u32 {
    parse_verbosity(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}

/// Install the process-wide verbosity level
///
/// Only the first call has an effect. Returns the level that is in force,
/// which differs from `level` when another device got there first.
pub fn install_verbosity(level: u32) -> u32 {
    let installed = *VERBOSITY.get_or_init(|| level.min(MAX_VERBOSITY));
    if installed != level.min(MAX_VERBOSITY) {
        log::debug!("Verbosity already installed at {installed}, ignoring {level}");
    }
    installed
}

/// Current process-wide verbosity level
///
/// Falls back to [`LOG_LEVEL_ENV`] when nothing was installed yet.
pub fn verbosity() -> u32 {
    *VERBOSITY.get_or_init(verbosity_from_env)
}

/// Map a numeric verbosity level onto a `log` filter
pub fn level_filter(level: u32) -> LevelFilter {
    match level {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verbosity_defaults_to_zero() {
        assert_eq!(parse_verbosity(None), 0);
        assert_eq!(parse_verbosity(Some("")), 0);
        assert_eq!(parse_verbosity(Some("loud")), 0);
        assert_eq!(parse_verbosity(Some("-1")), 0);
    }

    #[test]
    fn test_parse_verbosity_accepts_numbers() {
        assert_eq!(parse_verbosity(Some("2")), 2);
        assert_eq!(parse_verbosity(Some(" 1 ")), 1);
        assert_eq!(parse_verbosity(Some("42")), MAX_VERBOSITY);
    }

    #[test]
    fn test_verbosity_is_installed_once() {
        let first = verbosity();
        assert_eq!(install_verbosity(first + 1), first);
        assert_eq!(verbosity(), first);
    }

    #[test]
    fn test_level_filter_mapping() {
        assert_eq!(level_filter(0), LevelFilter::Warn);
        assert_eq!(level_filter(1), LevelFilter::Info);
        assert_eq!(level_filter(2), LevelFilter::Debug);
        assert_eq!(level_filter(9), LevelFilter::Trace);
    }
}
