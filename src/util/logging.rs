//! Structured logging setup for apkforge
//!
//! Log records go to stderr so that the output of the external tools, which
//! is forwarded to stdout and stderr as it arrives, stays readable. Filtering
//! honours `RUST_LOG` when it is set.
//!
//! # Example
//!
//! ```no_run
//! use apkforge::util::logging;
//!
//! logging::init_from_env();
//!
//! tracing::info!(tool = "jadx", "Decompiling");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const LEVEL_ENV: &str = "APKFORGE_LOG_LEVEL";
const JSON_ENV: &str = "APKFORGE_LOG_JSON";

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for apkforge's own records
    pub level: Level,

    /// Emit one JSON object per record
    pub use_json: bool,

    /// Include the module target (e.g. `apkforge::toolset`)
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON records with source locations, for log collectors
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

/// Parses a log level, case-insensitively
///
/// ```
/// use apkforge::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Some(Level::DEBUG));
/// assert_eq!(parse_level("WARN"), Some(Level::WARN));
/// assert_eq!(parse_level("loud"), None);
/// ```
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Picks the level from command-line flags, falling back to the environment
///
/// An explicit level wins over `--verbose`, which wins over `--quiet`.
pub fn resolve_level(explicit: Option<&str>, verbose: bool, quiet: bool) -> Level {
    if let Some(level) = explicit.and_then(parse_level) {
        level
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        env::var(LEVEL_ENV)
            .ok()
            .and_then(|value| parse_level(&value))
            .unwrap_or(Level::INFO)
    }
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("warn,apkforge={}", config.level))
        };

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Initializes logging from `APKFORGE_LOG_LEVEL` and `APKFORGE_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig {
        level: resolve_level(None, false, false),
        use_json: json_requested(),
        ..Default::default()
    });
}

/// Whether `APKFORGE_LOG_JSON` asks for JSON records
pub fn json_requested() -> bool {
    env::var(JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}
