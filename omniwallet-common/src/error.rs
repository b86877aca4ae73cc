//! Error types for the Omni wallet extension
//!
//! Coin selection and fee checks never fail: an unusable wallet simply
//! yields nothing. Errors exist for the surrounding plumbing (configuration
//! files, serialization) and for redemption key resolution, which callers
//! must treat as a hard stop.
//!
//! # Usage
//!
//! ```
//! use omniwallet_common::error::{with_io_context, OmniWalletResult};
//!
//! fn read_settings(path: &str) -> OmniWalletResult<String> {
//!     with_io_context(std::fs::read_to_string(path), "Failed to read settings")
//! }
//!
//! assert!(read_settings("/nonexistent/settings.toml").is_err());
//! ```

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

use crate::keys::KeyResolutionError;

/// The main error type for the crate
#[derive(Debug, Error)]
pub enum OmniWalletError {
    /// Redemption key could not be resolved
    #[error("Key error: {0}")]
    Key(#[from] KeyResolutionError),

    /// Configuration values rejected
    #[error("Configuration error: {context}")]
    Config {
        context: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// I/O errors
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Malformed configuration file
    #[error("Serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// Type alias for a Result with OmniWalletError
pub type OmniWalletResult<T> = Result<T, OmniWalletError>;

/// Attach context to an I/O result
pub fn with_io_context<T>(result: Result<T, io::Error>, context: impl Into<String>) -> OmniWalletResult<T> {
    result.map_err(|err| OmniWalletError::Io {
        context: context.into(),
        source: err,
    })
}

/// Wrap an `anyhow` configuration failure
pub fn from_config_result<T>(result: anyhow::Result<T>) -> OmniWalletResult<T> {
    result.map_err(|err| OmniWalletError::Config {
        context: err.to_string(),
        source: Some(err.into()),
    })
}

impl From<toml::de::Error> for OmniWalletError {
    fn from(err: toml::de::Error) -> Self {
        OmniWalletError::Serialization {
            context: format!("TOML deserialization error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

/// Error category for logging purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Key,
    Config,
    Io,
    Serialization,
}

impl ErrorCategory {
    /// Convert the error category to a string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Key => "key",
            ErrorCategory::Config => "config",
            ErrorCategory::Io => "io",
            ErrorCategory::Serialization => "serialization",
        }
    }
}

impl OmniWalletError {
    /// Get the category of this error for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            OmniWalletError::Key(_) => ErrorCategory::Key,
            OmniWalletError::Config { .. } => ErrorCategory::Config,
            OmniWalletError::Io { .. } => ErrorCategory::Io,
            OmniWalletError::Serialization { .. } => ErrorCategory::Serialization,
        }
    }
}
