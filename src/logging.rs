//! Logging setup.
//!
//! Structured logging via `tracing` with:
//! - presets selected by CLI flags (production, verbose, debug, quiet)
//! - text or JSON output
//! - `RUST_LOG` taking precedence when set
//!
//! All crate events use targets under `relay::` (`relay::startup`,
//! `relay::query`, `relay::model`, `relay::log`).

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, queries and failures.
    #[default]
    Production,
    /// Adds per-request HTTP traces.
    Verbose,
    /// Everything at debug level.
    Debug,
    /// Warnings and errors only.
    Quiet,
}

impl LogPreset {
    /// Picks a preset from CLI flags. Quiet wins, then debug, then verbose.
    pub fn from_flags(verbose: bool, debug: bool, quiet: bool) -> Self {
        if quiet {
            LogPreset::Quiet
        } else if debug {
            LogPreset::Debug
        } else if verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        }
    }

    fn directives(&self) -> &'static str {
        match self {
            LogPreset::Production => "relay=info,tower_http=warn",
            LogPreset::Verbose => "relay=info,tower_http=info",
            LogPreset::Debug => "relay=debug,tower_http=debug",
            LogPreset::Quiet => "relay=warn,tower_http=error",
        }
    }

    /// Builds the filter for this preset unless `RUST_LOG` is set.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives()).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
pub fn init(preset: LogPreset, format: LogFormat) {
    let filter = preset.build_filter();

    match format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}
