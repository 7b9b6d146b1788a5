//! Logging setup.
//!
//! Every signet crate logs through the `tracing` macros and never installs a
//! subscriber itself. Applications call [`LoggingConfig::init`] once at
//! startup.
//!
//! # Example
//!
//! ```
//! use signet_core::logging::{LogFormat, LoggingConfig};
//! use tracing::Level;
//!
//! // Development: pretty output with cache internals
//! let dev = LoggingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(LogFormat::Pretty);
//!
//! // Production: JSON lines, quiet HTTP stack
//! let prod = LoggingConfig::default()
//!     .with_format(LogFormat::Json)
//!     .with_env_filter("signet_cache=info,hyper=warn,reqwest=warn");
//!
//! dev.init();
//! assert!(!prod.init()); // already installed
//! ```

use core::fmt;
use core::str::FromStr;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive, e.g. `signet_cache=debug`.
pub const LOG_FILTER_ENV: &str = "SIGNET_LOG";

/// Environment variable selecting the [`LogFormat`].
pub const LOG_FORMAT_ENV: &str = "SIGNET_LOG_FORMAT";

// ─────────────────────────────────────────────────────────────────────────────
// LogFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

/// A format name other than `pretty`, `compact` or `json`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format '{0}'")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(UnknownLogFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LoggingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Maximum level when no filter is given.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
    /// Target-specific filter, e.g. `signet_cache=debug,hyper=warn`.
    pub env_filter: Option<String>,
    /// Whether span enter/exit events are logged.
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl LoggingConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`LOG_FILTER_ENV`] and [`LOG_FORMAT_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`UnknownLogFormat`] if the format variable names no format.
    pub fn from_env() -> Result<Self, UnknownLogFormat> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, UnknownLogFormat> {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|filter| !filter.trim().is_empty()) {
            config.env_filter = Some(filter);
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a target filter. Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Returns `false` if a subscriber was already installed, in which case
    /// this call has no effect.
    pub fn init(&self) -> bool {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(self.filter());
        let installed = match self.format {
            LogFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        }
        .is_ok();

        if installed {
            tracing::debug!(level = %self.level, format = %self.format, "logging initialized");
        }
        installed
    }
}
