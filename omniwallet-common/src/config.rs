//! Configuration management for the Omni wallet extension.
//!
//! Settings are stored in TOML. Every section has defaults, so an empty
//! file (or a missing section) yields the stock behaviour:
//!
//! ```toml
//! [selection]
//! network = "Bitcoin"
//! base_allowance_sats = 200000
//! debug_tokens = false
//!
//! [encoding]
//! datacarrier_enabled = true
//! max_datacarrier_bytes = 80
//!
//! [[policy.rules]]
//! script_type = "pub_key_hash"
//! activation_height = 0
//! ```
//!
//! When `[policy]` lists no rules, the consensus defaults for the
//! configured network apply.

use anyhow::{anyhow, Result};
use bitcoin::Network;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::error::{from_config_result, with_io_context, OmniWalletResult};
use crate::fee::{DEFAULT_MAX_DATACARRIER_BYTES, OMNI_MARKER};
use crate::logging::{self, LogConfig, LogLevel};
use crate::policy::{InputPolicy, PolicyRule};
use crate::types::DEFAULT_BASE_ALLOWANCE_SATS;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub encoding: EncodingConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Coin selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Bitcoin network (Bitcoin, Testnet, Signet, Regtest)
    #[serde(default = "default_network")]
    pub network: String,

    /// Amount every selection gathers before any caller reserve, in satoshis
    #[serde(default = "default_base_allowance")]
    pub base_allowance_sats: u64,

    /// Log every owned candidate output during selection
    #[serde(default)]
    pub debug_tokens: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            base_allowance_sats: default_base_allowance(),
            debug_tokens: false,
        }
    }
}

/// Payload encoding settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Whether OP_RETURN data carrier outputs may be created
    #[serde(default = "default_true")]
    pub datacarrier_enabled: bool,

    /// Largest data carrier payload relayed, marker included
    #[serde(default = "default_max_datacarrier_bytes")]
    pub max_datacarrier_bytes: usize,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            datacarrier_enabled: default_true(),
            max_datacarrier_bytes: default_max_datacarrier_bytes(),
        }
    }
}

/// Input allow-list override
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    /// Explicit rules; empty means the network defaults
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Load and validate configuration, reporting failures as crate errors
    ///
    /// A missing or unreadable file is an `Io` error, malformed TOML a
    /// `Serialization` error and rejected values a `Config` error.
    pub fn load_checked(path: &Path) -> OmniWalletResult<Self> {
        let result = Self::read_checked(path);
        match &result {
            Ok(config) => logging::log_core(
                LogLevel::Info,
                "configuration loaded",
                Some(json!({
                    "path": path.display().to_string(),
                    "network": config.selection.network,
                    "policy_rules": config.policy.rules.len(),
                })),
            ),
            Err(err) => logging::log_core(
                LogLevel::Error,
                "configuration rejected",
                Some(json!({
                    "path": path.display().to_string(),
                    "category": err.category().as_str(),
                    "error": err.to_string(),
                })),
            ),
        }
        result
    }

    fn read_checked(path: &Path) -> OmniWalletResult<Self> {
        let content = with_io_context(
            fs::read_to_string(path),
            format!("Failed to read config file {}", path.display()),
        )?;
        let config: Config = toml::from_str(&content)?;
        from_config_result(config.validate())?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, content).map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.network()?;

        if self.selection.base_allowance_sats == 0 {
            return Err(anyhow!("Invalid base allowance: must be greater than 0"));
        }

        if self.encoding.max_datacarrier_bytes < OMNI_MARKER.len() {
            anyhow::bail!(
                "Invalid data carrier size {}: must fit the {} byte marker",
                self.encoding.max_datacarrier_bytes,
                OMNI_MARKER.len()
            );
        }

        for rule in &self.policy.rules {
            if let Some(retired) = rule.retirement_height {
                if retired <= rule.activation_height {
                    anyhow::bail!(
                        "Invalid policy rule for {}: retired at {} before activation at {}",
                        rule.script_type,
                        retired,
                        rule.activation_height
                    );
                }
            }
        }

        Ok(())
    }

    /// Parse the configured network
    pub fn network(&self) -> Result<Network> {
        match self.selection.network.as_str() {
            "Bitcoin" => Ok(Network::Bitcoin),
            "Testnet" => Ok(Network::Testnet),
            "Signet" => Ok(Network::Signet),
            "Regtest" => Ok(Network::Regtest),
            other => Err(anyhow!("Invalid network type: {}", other)),
        }
    }

    /// Input policy: explicit rules if any, otherwise the network defaults
    pub fn input_policy(&self) -> Result<InputPolicy> {
        if self.policy.rules.is_empty() {
            Ok(InputPolicy::for_network(self.network()?))
        } else {
            Ok(InputPolicy::new(self.policy.rules.clone()))
        }
    }
}

/// Ensure a configuration file exists at the specified path
/// If it doesn't exist, create it with default values
pub fn ensure_config_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        let default_config = Config::default();
        let content = toml::to_string_pretty(&default_config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
            }
        }

        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write default config file: {}", e))?;
    }

    Ok(())
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_network() -> String {
    "Bitcoin".to_string()
}

fn default_base_allowance() -> u64 {
    DEFAULT_BASE_ALLOWANCE_SATS
}

fn default_max_datacarrier_bytes() -> usize {
    DEFAULT_MAX_DATACARRIER_BYTES
}
