//! Common data types for the Omni wallet extension
//!
//! These types describe the wallet state the selection engine reads and the
//! values it hands back. None of them carry private key material.

use bitcoin::{Amount, OutPoint, TxOut, Txid};
use serde::{Deserialize, Serialize};

// Constants for Bitcoin-specific values

/// Constant for satoshis per Bitcoin
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Transaction size assumed when budgeting for fees, in kilobytes
pub const ASSUMED_MAX_TX_KB: u64 = 20;

/// Fee rate assumed when budgeting for fees, in satoshis per kilobyte (0.0001 BTC/kB)
pub const ASSUMED_FEE_PER_KB: u64 = SATS_PER_BTC / 10_000;

/// Base amount every selection tries to gather: a 20 kB transaction at 0.0001 BTC/kB
pub const DEFAULT_BASE_ALLOWANCE_SATS: u64 = ASSUMED_MAX_TX_KB * ASSUMED_FEE_PER_KB;

/// Minimum fee a sender must be able to cover, in satoshis
///
/// Placeholder until fees are derived from the relay and wallet fee rates.
pub const MIN_FEE_SATS: u64 = 10_000;

/// A transaction as tracked by the wallet store
///
/// # Fields
///
/// * `txid` - Transaction id
/// * `outputs` - Outputs in index order
/// * `depth` - Depth in the main chain: negative if conflicted, 0 if unconfirmed
/// * `from_me` - Whether every input of the transaction spends a wallet output
/// * `in_mempool` - Whether the transaction is currently accepted to the mempool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletTx {
    /// Transaction id
    pub txid: Txid,

    /// Transaction outputs in index order
    pub outputs: Vec<TxOut>,

    /// Depth in the main chain (negative: conflicted, 0: unconfirmed)
    pub depth: i32,

    /// All inputs are the wallet's own
    pub from_me: bool,

    /// Accepted to the local mempool
    pub in_mempool: bool,
}

impl WalletTx {
    /// Create a confirmed transaction with the given depth
    pub fn confirmed(txid: Txid, outputs: Vec<TxOut>, depth: i32) -> Self {
        Self {
            txid,
            outputs,
            depth,
            from_me: false,
            in_mempool: false,
        }
    }

    /// Create an unconfirmed transaction sitting in the mempool
    pub fn unconfirmed(txid: Txid, outputs: Vec<TxOut>, from_me: bool) -> Self {
        Self {
            txid,
            outputs,
            depth: 0,
            from_me,
            in_mempool: true,
        }
    }

    /// Outpoint of the output at `vout`
    pub fn outpoint(&self, vout: u32) -> OutPoint {
        OutPoint::new(self.txid, vout)
    }
}

/// Outputs gathered by one selection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Sum of the selected output values
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub total: Amount,

    /// Selected outpoints in the order they were chosen
    pub selected: Vec<OutPoint>,
}

impl Default for SelectionResult {
    fn default() -> Self {
        Self {
            total: Amount::ZERO,
            selected: Vec::new(),
        }
    }
}

impl SelectionResult {
    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
