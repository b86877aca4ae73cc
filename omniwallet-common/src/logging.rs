//! Logging infrastructure for the Omni wallet extension
//!
//! This module configures the `log` facade with an `env_logger` backend and
//! provides helpers for structured diagnostics:
//! - Human-readable or JSON formatted output
//! - Optional log file target
//! - Truncation of addresses and keys before they reach the log
//! - Context tags for selection, wallet and key resolution events
//!
//! Logging is diagnostic only. Nothing in the crate depends on a logger
//! being installed.
//!
//! # Usage
//!
//! ```
//! use omniwallet_common::logging::{self, LogConfig, LogLevel};
//! use serde_json::json;
//!
//! logging::init(&LogConfig::default()).expect("Failed to initialize logging");
//!
//! logging::log_core(LogLevel::Info, "engine started", Some(json!({ "network": "regtest" })));
//! ```

use chrono::Local;
use env_logger::fmt::Formatter;
use log::{LevelFilter, Record};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Error conditions
    Error,
    /// Warning conditions
    Warn,
    /// Informational messages
    Info,
    /// Debug-level messages
    Debug,
    /// Trace level (very verbose)
    Trace,
}

/// Log context categories for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogContext {
    /// Engine setup and configuration
    Core,
    /// Wallet scans and coin selection
    Wallet,
    /// Redemption key resolution
    Keys,
}

/// Configuration for the logging system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level
    pub level: LogLevel,
    /// Path to log file (None for console-only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    /// Whether to include timestamps in log messages
    pub include_timestamps: bool,
    /// Whether to include source location in log messages
    pub include_source_location: bool,
    /// Whether to use JSON format for logs (machine-readable)
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_file: None,
            include_timestamps: true,
            include_source_location: true,
            json_format: false,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

// First initialization outcome, returned to every later caller
static LOGGING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the logging system with the given configuration
///
/// Only the first call configures the logger; later calls return its
/// outcome unchanged. A logger installed by someone else is left alone.
pub fn init(config: &LogConfig) -> Result<(), String> {
    LOGGING_INIT.get_or_init(|| install(config)).clone()
}

fn install(config: &LogConfig) -> Result<(), String> {
    let format = RecordFormat {
        timestamps: config.include_timestamps,
        source_location: config.include_source_location,
        json: config.json_format,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.level.into())
        .format(move |buf, record| format.write(buf, record));

    if let Some(path) = &config.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("Failed to open log file {}: {}", path, e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // Tests race to install a logger; losing that race is fine
    if let Err(e) = builder.try_init() {
        log::debug!("Logger already installed, keeping it: {}", e);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct RecordFormat {
    timestamps: bool,
    source_location: bool,
    json: bool,
}

impl RecordFormat {
    fn write(&self, buf: &mut Formatter, record: &Record) -> io::Result<()> {
        let timestamp = self
            .timestamps
            .then(|| Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string());
        let location = self.source_location.then(|| {
            format!(
                "{}:{}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0)
            )
        });

        if self.json {
            let line = json!({
                "timestamp": timestamp,
                "level": record.level().to_string(),
                "target": record.target(),
                "location": location,
                "message": record.args().to_string(),
            });
            return writeln!(buf, "{}", line);
        }

        if let Some(timestamp) = &timestamp {
            write!(buf, "{} ", timestamp)?;
        }
        let mut style = buf.style();
        style.set_bold(true);
        match &location {
            Some(location) => writeln!(
                buf,
                "[{} {}] {}",
                style.value(record.level()),
                location,
                record.args()
            ),
            None => writeln!(buf, "[{}] {}", style.value(record.level()), record.args()),
        }
    }
}

/// Truncate an address, key or other identifier for logging
///
/// Keeps the first and last four characters of long values and masks short
/// ones completely.
pub fn sanitize_for_logging(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "*****".to_string();
    }

    let first: String = chars[..4].iter().collect();
    let last: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", first, last)
}

fn log_with_context(
    level: LogLevel,
    context: LogContext,
    message: &str,
    params: Option<serde_json::Value>,
) {
    let level: log::Level = level.into();
    match params {
        Some(params) => log::log!(level, "[{:?}] {} {}", context, message, params),
        None => log::log!(level, "[{:?}] {}", context, message),
    }
}

/// Log an engine or configuration event
pub fn log_core(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Core, message, params);
}

/// Log a wallet scan or selection event
///
/// Callers are expected to pass identifiers through [`sanitize_for_logging`].
pub fn log_wallet(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Wallet, message, params);
}

/// Log a key resolution event
pub fn log_keys(level: LogLevel, message: &str, params: Option<serde_json::Value>) {
    log_with_context(level, LogContext::Keys, message, params);
}
