//! Logging infrastructure for the repair and render pipeline
//!
//! Structured logging uses the `tracing` crate. Native builds install a
//! `tracing-subscriber` registry; WASM builds log to the browser console
//! through `tracing-wasm`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use mermend::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `MERMEND_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `MERMEND_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Standard `tracing-subscriber` filter, takes precedence
//!
//! # Filtering Logs
//!
//! Each normalizer pass logs under its own module path:
//!
//! ```bash
//! # Show only the line repairer at debug level
//! RUST_LOG="mermend::passes::lines=debug" mermend normalize -i diagram.mmd
//!
//! # Everything at info, the render pipeline at trace
//! RUST_LOG="info,mermend::render=trace" mermend render -i diagram.mmd
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfigBuilder;

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// # Arguments
///
/// * `level` - Optional log level string (trace|debug|info|warn|error|off).
///   If None, uses `MERMEND_LOG_LEVEL` or `RUST_LOG`, or defaults to `info`.
/// * `format` - Optional log format (compact|pretty|json).
///   If None, uses `MERMEND_LOG_FORMAT`, or defaults to `compact`.
///
/// # Returns
///
/// Returns an error if the format is unknown or a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // The browser console has no format choice
        let _ = format;
        let Some(max_level) = console_max_level(level)? else {
            return Ok(());
        };
        let config = WASMLayerConfigBuilder::new()
            .set_max_level(max_level)
            .build();
        tracing_wasm::set_as_global_default_with_config(config);

        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let log_level = level
            .map(|s| s.to_string())
            .or_else(|| std::env::var("MERMEND_LOG_LEVEL").ok())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string());

        let log_format = format
            .map(|s| s.to_string())
            .or_else(|| std::env::var("MERMEND_LOG_FORMAT").ok())
            .unwrap_or_else(|| "compact".to_string());

        let filter = if log_level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let format = LogFormat::from_str(&log_format)
            .map_err(|e| format!("Invalid log format: {}", e))?;

        // Logs go to stderr so normalized markup on stdout stays clean
        match format {
            LogFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .with_level(true)
                            .with_file(false)
                            .with_line_number(false)
                            .with_span_events(FmtSpan::NONE),
                    )
                    .try_init()?;
            }
            LogFormat::Pretty => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_level(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::ACTIVE)
                            .pretty(),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_level(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::ACTIVE)
                            .json(),
                    )
                    .try_init()?;
            }
        }

        Ok(())
    }
}

/// Console level for WASM builds; `None` means logging is off.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn console_max_level(level: Option<&str>) -> Result<Option<tracing::Level>, String> {
    match level.map(str::trim) {
        None => Ok(Some(tracing::Level::INFO)),
        Some(level) if level.eq_ignore_ascii_case("off") => Ok(None),
        Some(level) => tracing::Level::from_str(level)
            .map(Some)
            .map_err(|_| format!("Invalid log level: {}", level)),
    }
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
