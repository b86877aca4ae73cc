use anyhow::Result;
use bitcoin::Network;
use omniwallet_common::config::{self, Config};
use omniwallet_common::error::ErrorCategory;
use omniwallet_common::{PolicyRule, ScriptType, DEFAULT_BASE_ALLOWANCE_SATS};
use std::fs;
use tempfile::TempDir;

// Helper function to write a config file into a fresh temporary directory
fn write_test_config(content: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, content).expect("Failed to write test config");
    let config_path_str = config_path.to_string_lossy().to_string();
    (temp_dir, config_path_str)
}

#[test]
fn test_ensure_config_exists_creates_default() -> Result<()> {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("omniwallet.toml");

    config::ensure_config_exists(&config_path)?;
    assert!(config_path.exists(), "Config file was not created");

    let config = Config::load(config_path.to_str().unwrap())?;
    config.validate()?;
    assert_eq!(config.selection.network, "Bitcoin");
    assert_eq!(config.selection.base_allowance_sats, DEFAULT_BASE_ALLOWANCE_SATS);
    assert!(!config.selection.debug_tokens);
    assert!(config.encoding.datacarrier_enabled);
    assert_eq!(config.encoding.max_datacarrier_bytes, 80);
    assert!(config.policy.rules.is_empty());

    Ok(())
}

#[test]
fn test_ensure_config_exists_keeps_existing_file() -> Result<()> {
    let (_dir, path) = write_test_config(
        r#"
        [selection]
        network = "Regtest"
        "#,
    );

    config::ensure_config_exists(std::path::Path::new(&path))?;
    let config = Config::load(&path)?;
    assert_eq!(config.network()?, Network::Regtest);

    Ok(())
}

#[test]
fn test_empty_file_yields_defaults() -> Result<()> {
    let (_dir, path) = write_test_config("");

    let config = Config::load(&path)?;
    config.validate()?;
    assert_eq!(config.network()?, Network::Bitcoin);
    assert_eq!(config.encoding, Default::default());

    Ok(())
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("saved.toml");
    let path = path.to_str().unwrap();

    let mut config = Config::default();
    config.selection.network = "Testnet".to_string();
    config.selection.base_allowance_sats = 500_000;
    config.selection.debug_tokens = true;
    config.encoding.max_datacarrier_bytes = 223;
    config.policy.rules = vec![PolicyRule::new(ScriptType::PubKeyHash, 0)];
    config.save(path)?;

    let loaded = Config::load(path)?;
    assert_eq!(loaded.network()?, Network::Testnet);
    assert_eq!(loaded.selection.base_allowance_sats, 500_000);
    assert!(loaded.selection.debug_tokens);
    assert_eq!(loaded.encoding, config.encoding);
    assert_eq!(loaded.policy.rules, config.policy.rules);

    Ok(())
}

#[test]
fn test_policy_rules_override_network_defaults() -> Result<()> {
    let (_dir, path) = write_test_config(
        r#"
        [selection]
        network = "Bitcoin"

        [[policy.rules]]
        script_type = "pub_key_hash"
        activation_height = 0

        [[policy.rules]]
        script_type = "witness_v0_key_hash"
        activation_height = 500000
        retirement_height = 600000
        "#,
    );

    let config = Config::load(&path)?;
    config.validate()?;
    let policy = config.input_policy()?;

    assert!(policy.is_allowed(ScriptType::PubKeyHash, 0));
    assert!(!policy.is_allowed(ScriptType::ScriptHash, 700_000));
    assert!(!policy.is_allowed(ScriptType::WitnessV0KeyHash, 499_999));
    assert!(policy.is_allowed(ScriptType::WitnessV0KeyHash, 500_000));
    assert!(!policy.is_allowed(ScriptType::WitnessV0KeyHash, 600_000));

    Ok(())
}

#[test]
fn test_network_defaults_when_no_rules() -> Result<()> {
    let (_dir, path) = write_test_config(
        r#"
        [selection]
        network = "Bitcoin"
        "#,
    );

    let policy = Config::load(&path)?.input_policy()?;
    assert!(policy.is_allowed(ScriptType::PubKeyHash, 0));
    assert!(!policy.is_allowed(ScriptType::ScriptHash, 321_999));
    assert!(policy.is_allowed(ScriptType::ScriptHash, 322_000));

    Ok(())
}

#[test]
fn test_invalid_values_fail_validation() {
    let mut config = Config::default();
    config.selection.network = "Dogecoin".to_string();
    assert!(config.validate().is_err());
    assert!(config.input_policy().is_err());

    let mut config = Config::default();
    config.selection.base_allowance_sats = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.encoding.max_datacarrier_bytes = 3;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.policy.rules = vec![PolicyRule::new(ScriptType::ScriptHash, 100).retired_at(100)];
    assert!(config.validate().is_err());
}

#[test]
fn test_load_checked_reports_config_errors() {
    let (_dir, path) = write_test_config(
        r#"
        [selection]
        network = "Nowhere"
        "#,
    );

    let err = Config::load_checked(std::path::Path::new(&path)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Config);
    assert!(err.to_string().contains("Invalid network type: Nowhere"));

    let (_dir, path) = write_test_config("[selection\nnetwork = ");
    let err = Config::load_checked(std::path::Path::new(&path)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Serialization);

    let dir = TempDir::new().expect("Failed to create temp directory");
    let err = Config::load_checked(&dir.path().join("missing.toml")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_load_checked_accepts_valid_file() -> Result<()> {
    let (_dir, path) = write_test_config(
        r#"
        [selection]
        network = "Signet"
        "#,
    );

    let config = Config::load_checked(std::path::Path::new(&path))?;
    assert_eq!(config.network()?, Network::Signet);
    Ok(())
}

#[test]
fn test_malformed_toml_is_rejected() {
    let (_dir, path) = write_test_config("[selection\nnetwork = ");
    assert!(Config::load(&path).is_err());
}
