//! Structured logging setup
//!
//! The router only emits `tracing` events; installing a subscriber is left to
//! the host. [`init_logging`] is the stock setup: JSON lines for production,
//! pretty output for development, filtered by level and optional per-target
//! directives.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ROUTECHAIN_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `ROUTECHAIN_LOG_FORMAT` | `json` | json/pretty |
//! | `ROUTECHAIN_LOG_TARGETS` | unset | comma-separated directives, e.g. `routechain::router=debug` |
//! | `ROUTECHAIN_LOG_LOCATION` | `false` | include file:line |
//!
//! `RUST_LOG`, when set, replaces the level from `ROUTECHAIN_LOG_LEVEL`.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("ROUTECHAIN_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("ROUTECHAIN_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            target_filter: env::var("ROUTECHAIN_LOG_TARGETS")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            include_location: env::var("ROUTECHAIN_LOG_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Development preset: debug level, pretty output, locations on.
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    /// Level parsed from `log_level`, falling back to INFO.
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Directives from `target_filter`, skipping blanks.
    fn directives(&self) -> impl Iterator<Item = &str> {
        self.target_filter
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Install a global `tracing` subscriber built from `config`.
///
/// # Errors
///
/// Fails when a subscriber is already installed.
///
/// ```no_run
/// use routechain::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let level = config.level();
    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    for directive in config.directives() {
        match directive.parse() {
            Ok(d) => env_filter = env_filter.add_directive(d),
            Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
        }
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Json);
    }

    #[test]
    fn test_level_fallback() {
        let mut config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        config.log_level = "DEBUG".into();
        assert_eq!(config.level(), Level::DEBUG);
        config.log_level = "verbose".into();
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_directives_skip_blanks() {
        let config = LogConfig {
            target_filter: Some("routechain::router=debug, ,routechain=warn".into()),
            ..LogConfig::default()
        };
        let directives: Vec<&str> = config.directives().collect();
        assert_eq!(directives, ["routechain::router=debug", "routechain=warn"]);
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default_dev();
        // the first call may lose to another test installing a subscriber
        let _first = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
