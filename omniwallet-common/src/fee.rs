//! Fee feasibility checks
//!
//! Answers whether a sender holds enough spendable value to pay the
//! minimum fee of a token transaction carrying a payload of a given size.
//!
//! # Encoding classes
//!
//! Token payloads are embedded either in an OP_RETURN output (Class C) when
//! they fit the data carrier limit, or in bare multisig outputs (Class B)
//! otherwise. The class drives the expected transaction size and hence the
//! fee, although both classes currently share the same flat minimum.

use bitcoin::Amount;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::coin_control::CoinControl;
use crate::config::EncodingConfig;
use crate::selection::CoinSelector;
use crate::types::MIN_FEE_SATS;

/// Protocol marker prefixed to Class C payloads ("omni")
pub const OMNI_MARKER: [u8; 4] = [0x6f, 0x6d, 0x6e, 0x69];

/// Default maximum number of bytes relayed in a data carrier output
pub const DEFAULT_MAX_DATACARRIER_BYTES: usize = 80;

/// Payload embedding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingClass {
    /// Payload spread over bare multisig outputs
    ClassB,
    /// Payload in a single OP_RETURN output
    ClassC,
}

impl EncodingClass {
    /// Pick the encoding class for a payload of `payload_size` bytes
    ///
    /// Only the data carrier settings decide. Whether OP_RETURN outputs are
    /// allowed at the current height is not checked; both classes share one
    /// minimum fee, so the fee check cannot tell the difference.
    pub fn for_payload(payload_size: usize, config: &EncodingConfig) -> Self {
        let total_size = payload_size.saturating_add(OMNI_MARKER.len());
        if config.datacarrier_enabled && total_size <= config.max_datacarrier_bytes {
            EncodingClass::ClassC
        } else {
            EncodingClass::ClassB
        }
    }
}

/// Minimum fee a sender must be able to cover for `class`
// TODO: derive from the relay fee for ~200 byte outputs plus the wallet
// minimum fee instead of a flat 10 000 sat warning threshold.
pub fn minimum_fee(class: EncodingClass) -> Amount {
    match class {
        EncodingClass::ClassB => Amount::from_sat(MIN_FEE_SATS),
        EncodingClass::ClassC => Amount::from_sat(MIN_FEE_SATS),
    }
}

/// Checks whether a sender can afford the minimum transaction fee
pub struct FeeChecker<'a> {
    selector: &'a CoinSelector<'a>,
    encoding: EncodingConfig,
}

impl<'a> FeeChecker<'a> {
    /// Create a checker backed by `selector`
    pub fn new(selector: &'a CoinSelector<'a>, encoding: EncodingConfig) -> Self {
        Self { selector, encoding }
    }

    /// Whether `from_address` holds enough spendable value for the minimum fee
    ///
    /// Runs a selection with no additional reserve into a throwaway coin
    /// control. Never mutates wallet state.
    pub fn check_fee(&self, from_address: &str, payload_size: usize) -> bool {
        let class = EncodingClass::for_payload(payload_size, &self.encoding);
        let min_fee = minimum_fee(class);

        let mut coin_control = CoinControl::new();
        let input_total = self.selector.select_into(from_address, &mut coin_control, 0);

        debug!(
            "Fee check: {:?}, payload {} bytes, inputs {}, minimum {}",
            class, payload_size, input_total, min_fee
        );
        input_total >= min_fee
    }
}
