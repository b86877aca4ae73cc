//! Greedy coin selection for a single sender address
//!
//! The selector walks the wallet's trusted transactions in the order the
//! wallet store yields them and picks up every spendable output paying to
//! the sender, until the gathered value covers the target cap.
//!
//! # Overview
//!
//! The cap is a fixed base allowance (enough for a 20 kB transaction at
//! 0.0001 BTC/kB) plus an optional reserve requested by the caller. An
//! output is picked up only if:
//!
//! - its transaction is trusted by the wallet
//! - it passes [`check_input`] at the current height
//! - its script is owned by the wallet
//! - it has not been spent
//! - its destination address equals the sender address exactly
//!
//! The scan stops as soon as the running total reaches the cap.
//!
//! # Usage
//!
//! ```
//! use omniwallet_common::policy::InputPolicy;
//! use omniwallet_common::selection::CoinSelector;
//! use omniwallet_common::wallet::{MemoryChain, MemoryWallet, WalletStore};
//! use bitcoin::Network;
//!
//! let wallet = MemoryWallet::new(Network::Regtest);
//! let chain = MemoryChain::new(100);
//! let policy = InputPolicy::for_network(Network::Regtest);
//!
//! let selector = CoinSelector::new(
//!     Some(&wallet as &dyn WalletStore),
//!     &chain,
//!     &policy,
//!     Network::Regtest,
//! );
//! let result = selector.select("mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn", 0);
//! assert!(result.is_empty());
//! ```
//!
//! # Ordering
//!
//! Results depend on the wallet store's enumeration order. The selector
//! does not sort candidates; two stores holding the same outputs in a
//! different order can yield different selections.

use bitcoin::{Amount, Network};
use log::{debug, warn};
use serde_json::json;
use std::collections::HashSet;

use crate::coin_control::CoinControl;
use crate::config::SelectionConfig;
use crate::eligibility::check_input;
use crate::logging::{self, sanitize_for_logging, LogLevel};
use crate::policy::InputPolicy;
use crate::types::{SelectionResult, DEFAULT_BASE_ALLOWANCE_SATS};
use crate::wallet::{ChainState, ConsistentRead, WalletStore};

/// Greedy first-fit selector over one wallet
pub struct CoinSelector<'a> {
    wallet: Option<&'a dyn WalletStore>,
    chain: &'a dyn ChainState,
    policy: &'a InputPolicy,
    network: Network,
    base_allowance: Amount,
    debug_tokens: bool,
}

impl<'a> CoinSelector<'a> {
    /// Create a selector with the default base allowance
    ///
    /// # Arguments
    /// * `wallet` - Wallet store, or `None` if no wallet is loaded
    /// * `chain` - Chain state provider
    /// * `policy` - Input allow-list
    /// * `network` - Network used to encode destination addresses
    pub fn new(
        wallet: Option<&'a dyn WalletStore>,
        chain: &'a dyn ChainState,
        policy: &'a InputPolicy,
        network: Network,
    ) -> Self {
        Self {
            wallet,
            chain,
            policy,
            network,
            base_allowance: Amount::from_sat(DEFAULT_BASE_ALLOWANCE_SATS),
            debug_tokens: false,
        }
    }

    /// Apply base allowance and debug settings from configuration
    pub fn configure(mut self, config: &SelectionConfig) -> Self {
        self.base_allowance = Amount::from_sat(config.base_allowance_sats);
        self.debug_tokens = config.debug_tokens;
        self
    }

    /// Override the base allowance
    pub fn with_base_allowance(mut self, allowance: Amount) -> Self {
        self.base_allowance = allowance;
        self
    }

    /// Log every owned candidate output while scanning
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_tokens = enabled;
        self
    }

    /// Network used to encode destination addresses
    pub fn network(&self) -> Network {
        self.network
    }

    /// Amount a selection stops at: base allowance plus a positive reserve
    pub fn target_cap(&self, additional: i64) -> Amount {
        let reserve = if additional > 0 {
            Amount::from_sat(additional as u64)
        } else {
            Amount::ZERO
        };
        self.base_allowance
            .checked_add(reserve)
            .unwrap_or_else(Amount::max_value)
    }

    /// Select outputs of `from_address` until the target cap is covered
    ///
    /// Returns an empty result if no wallet is loaded, a collaborator cannot
    /// be read, or nothing eligible pays to `from_address`.
    pub fn select(&self, from_address: &str, additional: i64) -> SelectionResult {
        let mut result = SelectionResult::default();

        if from_address.is_empty() {
            debug!("Empty sender address, nothing to select");
            return result;
        }
        let Some(wallet) = self.wallet else {
            debug!("No wallet loaded, nothing to select");
            return result;
        };

        let cap = self.target_cap(additional);
        let Some(read) = ConsistentRead::begin(self.chain, wallet) else {
            debug!("Wallet or chain state unavailable, nothing to select");
            return result;
        };
        let height = read.height();
        let view = read.wallet();
        let mut seen = HashSet::new();

        'scan: for tx in view.transactions() {
            if !view.is_trusted(tx) {
                continue;
            }

            for (vout, txout) in tx.outputs.iter().enumerate() {
                let Some(input) = check_input(txout, height, self.policy, self.network) else {
                    continue;
                };
                if !view.is_mine(&txout.script_pubkey) {
                    continue;
                }
                let outpoint = tx.outpoint(vout as u32);
                if view.is_spent(&outpoint) {
                    continue;
                }

                let address = input.destination.to_string();
                if self.debug_tokens {
                    debug!(
                        "sender: {}, outpoint: {}, value: {}",
                        sanitize_for_logging(&address),
                        outpoint,
                        txout.value
                    );
                }

                // only use funds from the sender's address
                if address != from_address || !seen.insert(outpoint) {
                    continue;
                }

                let Some(total) = result.total.checked_add(Amount::from_sat(txout.value)) else {
                    warn!("Selected value overflows, stopping at {}", result.total);
                    break 'scan;
                };
                result.total = total;
                result.selected.push(outpoint);

                if result.total >= cap {
                    break 'scan;
                }
            }
        }

        logging::log_wallet(
            LogLevel::Debug,
            "coin selection finished",
            Some(json!({
                "sender": sanitize_for_logging(from_address),
                "height": height,
                "cap_sats": cap.to_sat(),
                "total_sats": result.total.to_sat(),
                "inputs": result.selected.len(),
            })),
        );

        result
    }

    /// Select outputs and pin them in `coin_control`
    ///
    /// Returns the total value of the outputs selected by this call.
    pub fn select_into(
        &self,
        from_address: &str,
        coin_control: &mut CoinControl,
        additional: i64,
    ) -> Amount {
        let result = self.select(from_address, additional);
        for outpoint in &result.selected {
            coin_control.select(*outpoint);
        }
        result.total
    }
}
