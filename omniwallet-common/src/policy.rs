//! Script classification and the input allow-list
//!
//! Outputs can only fund a token transaction if their script type is
//! accepted as an input by the protocol rules in force at the current
//! block height. This module provides:
//!
//! - [`ScriptType`]: the standard output script templates the wallet knows
//! - [`PolicyRule`]: the height window in which one script type is allowed
//! - [`InputPolicy`]: the full allow-list, with per-network defaults
//!
//! # Usage
//!
//! ```
//! use omniwallet_common::policy::{InputPolicy, ScriptType};
//! use bitcoin::Network;
//!
//! let policy = InputPolicy::for_network(Network::Bitcoin);
//! assert!(policy.is_allowed(ScriptType::PubKeyHash, 0));
//! assert!(!policy.is_allowed(ScriptType::ScriptHash, 321_999));
//! assert!(policy.is_allowed(ScriptType::ScriptHash, 322_000));
//! ```

use bitcoin::{Network, Script};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Height at which pay-to-script-hash outputs became valid inputs on mainnet
pub const MAINNET_SCRIPTHASH_BLOCK: u32 = 322_000;

const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const OP_CHECKMULTISIG: u8 = 0xae;

/// Standard output script templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    /// Bare public key followed by OP_CHECKSIG
    PubKey,
    /// Pay to public key hash
    PubKeyHash,
    /// Pay to script hash
    ScriptHash,
    /// Bare m-of-n multisig
    Multisig,
    /// OP_RETURN data carrier
    NullData,
    /// Pay to witness public key hash (segwit v0)
    WitnessV0KeyHash,
    /// Pay to witness script hash (segwit v0)
    WitnessV0ScriptHash,
    /// Pay to taproot (segwit v1)
    WitnessV1Taproot,
}

impl ScriptType {
    /// Classify a script, returning `None` for non-standard scripts
    pub fn classify(script: &Script) -> Option<Self> {
        if script.is_p2pkh() {
            Some(ScriptType::PubKeyHash)
        } else if script.is_p2sh() {
            Some(ScriptType::ScriptHash)
        } else if script.is_v0_p2wpkh() {
            Some(ScriptType::WitnessV0KeyHash)
        } else if script.is_v0_p2wsh() {
            Some(ScriptType::WitnessV0ScriptHash)
        } else if script.is_v1_p2tr() {
            Some(ScriptType::WitnessV1Taproot)
        } else if script.is_p2pk() {
            Some(ScriptType::PubKey)
        } else if script.is_op_return() {
            Some(ScriptType::NullData)
        } else if is_bare_multisig(script.as_bytes()) {
            Some(ScriptType::Multisig)
        } else {
            None
        }
    }

    /// Name used in logs and configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::PubKey => "pubkey",
            ScriptType::PubKeyHash => "pub_key_hash",
            ScriptType::ScriptHash => "script_hash",
            ScriptType::Multisig => "multisig",
            ScriptType::NullData => "null_data",
            ScriptType::WitnessV0KeyHash => "witness_v0_key_hash",
            ScriptType::WitnessV0ScriptHash => "witness_v0_script_hash",
            ScriptType::WitnessV1Taproot => "witness_v1_taproot",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// OP_m <pubkeys> OP_n OP_CHECKMULTISIG
fn is_bare_multisig(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    let first = bytes[0];
    let n = bytes[bytes.len() - 2];
    let last = bytes[bytes.len() - 1];

    last == OP_CHECKMULTISIG
        && (OP_1..=OP_16).contains(&first)
        && (OP_1..=OP_16).contains(&n)
        && first <= n
}

/// Height window in which a script type is accepted as an input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Script type this rule applies to
    pub script_type: ScriptType,

    /// First block height at which the type is allowed
    pub activation_height: u32,

    /// Block height from which the type is no longer allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_height: Option<u32>,
}

impl PolicyRule {
    /// Rule allowing `script_type` from `activation_height` onwards
    pub fn new(script_type: ScriptType, activation_height: u32) -> Self {
        Self {
            script_type,
            activation_height,
            retirement_height: None,
        }
    }

    /// Stop allowing the type from `height` onwards
    pub fn retired_at(mut self, height: u32) -> Self {
        self.retirement_height = Some(height);
        self
    }

    /// Whether this rule admits its script type at `height`
    pub fn allows(&self, height: u32) -> bool {
        height >= self.activation_height
            && self.retirement_height.map_or(true, |retired| height < retired)
    }
}

/// Allow-list of script types usable as transaction inputs
///
/// Types without a rule are never allowed. When several rules name the
/// same type, the type is allowed if any of them admits the height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPolicy {
    rules: Vec<PolicyRule>,
}

impl InputPolicy {
    /// Build a policy from explicit rules
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    /// Default consensus rules for a network
    pub fn for_network(network: Network) -> Self {
        let scripthash_block = match network {
            Network::Bitcoin => MAINNET_SCRIPTHASH_BLOCK,
            _ => 0,
        };

        Self::new(vec![
            PolicyRule::new(ScriptType::PubKeyHash, 0),
            PolicyRule::new(ScriptType::ScriptHash, scripthash_block),
        ])
    }

    /// Whether `script_type` is an allowed input type at `height`
    pub fn is_allowed(&self, script_type: ScriptType, height: u32) -> bool {
        self.rules
            .iter()
            .filter(|rule| rule.script_type == script_type)
            .any(|rule| rule.allows(height))
    }

    /// The rules making up this policy
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }
}
