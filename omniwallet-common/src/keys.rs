//! Redemption key resolution
//!
//! A caller names a redemption key either by an address whose key the
//! wallet holds, or directly as a hex-encoded public key. This module turns
//! that string into a fully validated [`PublicKey`].
//!
//! # Resolution order
//!
//! 1. If a wallet is loaded and the string is an address for the active
//!    network, the wallet must hold the public key behind it.
//! 2. Otherwise, if the string is hex, its bytes are parsed as a public key.
//!
//! The result must be a valid compressed (33 bytes) or uncompressed
//! (65 bytes) encoding of a point on the curve.

use bitcoin::address::{NetworkUnchecked, Payload};
use bitcoin::{Address, Network, PublicKey};
use serde_json::json;
use std::str::FromStr;
use thiserror::Error;

use crate::logging::{self, sanitize_for_logging, LogLevel};
use crate::wallet::WalletStore;

/// Errors returned when a redemption key cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyResolutionError {
    #[error("redemption address {0} does not refer to a public key")]
    NotAKeyAddress(String),

    #[error("no public key in wallet for redemption address {0}")]
    UnknownKey(String),

    #[error("invalid redemption key {0}")]
    InvalidKey(String),
}

/// Resolve `key` to a validated public key
///
/// # Arguments
/// * `key` - Address known to the wallet, or hex-encoded public key
/// * `wallet` - Wallet store, or `None` if no wallet is loaded
/// * `network` - Network addresses are expected to belong to
///
/// # Returns
/// * The public key, or the reason it could not be resolved
pub fn resolve_public_key(
    key: &str,
    wallet: Option<&dyn WalletStore>,
    network: Network,
) -> Result<PublicKey, KeyResolutionError> {
    let result = resolve(key, wallet, network);
    if let Err(e) = &result {
        logging::log_keys(
            LogLevel::Error,
            "redemption key resolution failed",
            Some(json!({
                "key": sanitize_for_logging(key),
                "reason": failure_reason(e),
            })),
        );
    }
    result
}

fn resolve(
    key: &str,
    wallet: Option<&dyn WalletStore>,
    network: Network,
) -> Result<PublicKey, KeyResolutionError> {
    if let (Some(wallet), Some(address)) = (wallet, parse_address(key, network)) {
        let Payload::PubkeyHash(key_id) = address.payload else {
            return Err(KeyResolutionError::NotAKeyAddress(key.to_string()));
        };
        let public_key = wallet
            .public_key(&key_id)
            .ok_or_else(|| KeyResolutionError::UnknownKey(key.to_string()))?;
        return validate(public_key.to_bytes(), key);
    }

    match decode_hex(key) {
        Some(bytes) => validate(bytes, key),
        None => Err(KeyResolutionError::InvalidKey(key.to_string())),
    }
}

fn parse_address(key: &str, network: Network) -> Option<Address<NetworkUnchecked>> {
    Address::<NetworkUnchecked>::from_str(key)
        .ok()
        .filter(|address| address.is_valid_for_network(network))
}

// Non-empty, even length, hex digits only
fn decode_hex(key: &str) -> Option<Vec<u8>> {
    if key.is_empty() {
        return None;
    }
    hex::decode(key).ok()
}

fn validate(bytes: Vec<u8>, key: &str) -> Result<PublicKey, KeyResolutionError> {
    PublicKey::from_slice(&bytes).map_err(|_| KeyResolutionError::InvalidKey(key.to_string()))
}

fn failure_reason(error: &KeyResolutionError) -> &'static str {
    match error {
        KeyResolutionError::NotAKeyAddress(_) => "address does not refer to a key",
        KeyResolutionError::UnknownKey(_) => "key not in wallet",
        KeyResolutionError::InvalidKey(_) => "invalid key encoding",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_length_hex_is_rejected() {
        assert!(decode_hex("abc").is_none());
        assert!(decode_hex("").is_none());
        assert_eq!(decode_hex("0a0b"), Some(vec![0x0a, 0x0b]));
    }

    #[test]
    fn out_of_range_coordinate_is_invalid() {
        // Correct length and prefix, but x exceeds the field prime
        let key = format!("02{}", "ff".repeat(32));
        assert_eq!(
            resolve_public_key(&key, None, Network::Regtest),
            Err(KeyResolutionError::InvalidKey(key.clone()))
        );
    }
}
