//! Wallet and chain collaborators
//!
//! The selection engine never reaches into process-wide state. Callers hand
//! it explicit handles to a wallet store and a chain state provider, and the
//! engine reads both through scoped snapshots.
//!
//! # Overview
//!
//! - [`WalletStore`] / [`WalletView`]: the wallet's transactions, ownership,
//!   spent outputs and public keys
//! - [`ChainState`] / [`ChainView`]: the current block height
//! - [`ConsistentRead`]: holds a chain snapshot and a wallet snapshot at the
//!   same time, so writers are excluded for as long as the guard lives
//! - [`MemoryWallet`] / [`MemoryChain`]: `RwLock` backed implementations
//!
//! # Locking
//!
//! [`ConsistentRead::begin`] always takes the chain snapshot before the
//! wallet snapshot. Backends that share locks with other components must
//! follow the same order.

use bitcoin::{Address, Network, OutPoint, PubkeyHash, PublicKey, Script, ScriptBuf, Txid};
use log::{trace, warn};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::types::WalletTx;

/// Read access to a frozen view of the wallet
pub trait WalletView {
    /// Transactions in the backend's enumeration order
    fn transactions(&self) -> Box<dyn Iterator<Item = &WalletTx> + '_>;

    /// Whether the wallet considers `tx` safe to fund new transactions
    fn is_trusted(&self, tx: &WalletTx) -> bool;

    /// Whether the output has already been consumed
    fn is_spent(&self, outpoint: &OutPoint) -> bool;

    /// Whether the wallet can spend outputs locked to `script`
    fn is_mine(&self, script: &Script) -> bool;
}

/// A wallet that can hand out consistent read snapshots
pub trait WalletStore {
    /// Begin a read; writers are blocked until the returned view is dropped
    ///
    /// Returns `None` when the wallet cannot currently be read.
    fn begin_read(&self) -> Option<Box<dyn WalletView + '_>>;

    /// Look up a public key by its key id
    fn public_key(&self, key_id: &PubkeyHash) -> Option<PublicKey>;
}

/// Read access to a frozen view of the chain
pub trait ChainView {
    /// Current best block height
    fn height(&self) -> u32;
}

/// Provider of chain state snapshots
pub trait ChainState {
    /// Begin a read; height updates are blocked until the view is dropped
    fn begin_read(&self) -> Option<Box<dyn ChainView + '_>>;
}

/// Chain and wallet snapshots held together for the duration of a scan
pub struct ConsistentRead<'a> {
    // Fields drop in declaration order: the wallet is released before the chain.
    wallet: Box<dyn WalletView + 'a>,
    chain: Box<dyn ChainView + 'a>,
}

impl<'a> ConsistentRead<'a> {
    /// Acquire the chain snapshot, then the wallet snapshot
    ///
    /// Returns `None` if either collaborator is unavailable. A chain snapshot
    /// that was already taken is released before returning.
    pub fn begin(chain: &'a dyn ChainState, wallet: &'a dyn WalletStore) -> Option<Self> {
        let chain = chain.begin_read()?;
        let wallet = wallet.begin_read()?;
        trace!("Consistent read acquired at height {}", chain.height());
        Some(Self { wallet, chain })
    }

    /// Block height as seen by this snapshot
    pub fn height(&self) -> u32 {
        self.chain.height()
    }

    /// Wallet view of this snapshot
    pub fn wallet(&self) -> &dyn WalletView {
        self.wallet.as_ref()
    }
}

/// Default trust policy for wallet transactions
///
/// Confirmed transactions are trusted and conflicted ones are not. An
/// unconfirmed transaction is trusted only when spending unconfirmed change
/// is enabled, every input is our own and it sits in the mempool.
pub fn is_trusted_by_policy(tx: &WalletTx, spend_zero_conf_change: bool) -> bool {
    if tx.depth >= 1 {
        return true;
    }
    if tx.depth < 0 {
        return false;
    }
    spend_zero_conf_change && tx.from_me && tx.in_mempool
}

#[derive(Debug, Default)]
struct WalletState {
    transactions: BTreeMap<Txid, WalletTx>,
    spent: HashSet<OutPoint>,
    owned_scripts: HashSet<ScriptBuf>,
    keys: HashMap<PubkeyHash, PublicKey>,
}

/// In-memory wallet store
///
/// Transactions are keyed by txid and enumerated in txid order.
#[derive(Debug)]
pub struct MemoryWallet {
    network: Network,
    spend_zero_conf_change: bool,
    state: RwLock<WalletState>,
}

impl MemoryWallet {
    /// Create an empty wallet for `network`
    pub fn new(network: Network) -> Self {
        Self {
            network,
            spend_zero_conf_change: true,
            state: RwLock::new(WalletState::default()),
        }
    }

    /// Set whether unconfirmed self-sent transactions may fund new ones
    pub fn with_spend_zero_conf_change(mut self, enabled: bool) -> Self {
        self.spend_zero_conf_change = enabled;
        self
    }

    /// Network this wallet derives addresses for
    pub fn network(&self) -> Network {
        self.network
    }

    /// Import a public key, returning the P2PKH address it controls
    pub fn add_key(&self, key: PublicKey) -> Address {
        let address = Address::p2pkh(&key, self.network);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.keys.insert(key.pubkey_hash(), key);
        state.owned_scripts.insert(address.script_pubkey());
        address
    }

    /// Mark outputs locked to `script` as spendable by this wallet
    pub fn add_owned_script(&self, script: ScriptBuf) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.owned_scripts.insert(script);
    }

    /// Add or replace a transaction
    pub fn add_transaction(&self, tx: WalletTx) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.transactions.insert(tx.txid, tx);
    }

    /// Record that an output has been consumed
    pub fn mark_spent(&self, outpoint: OutPoint) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.spent.insert(outpoint);
    }

    /// Number of tracked transactions
    pub fn transaction_count(&self) -> usize {
        self.state
            .read()
            .map(|state| state.transactions.len())
            .unwrap_or(0)
    }
}

struct MemoryWalletView<'a> {
    state: RwLockReadGuard<'a, WalletState>,
    spend_zero_conf_change: bool,
}

impl WalletView for MemoryWalletView<'_> {
    fn transactions(&self) -> Box<dyn Iterator<Item = &WalletTx> + '_> {
        Box::new(self.state.transactions.values())
    }

    fn is_trusted(&self, tx: &WalletTx) -> bool {
        is_trusted_by_policy(tx, self.spend_zero_conf_change)
    }

    fn is_spent(&self, outpoint: &OutPoint) -> bool {
        self.state.spent.contains(outpoint)
    }

    fn is_mine(&self, script: &Script) -> bool {
        self.state.owned_scripts.contains(script)
    }
}

impl WalletStore for MemoryWallet {
    fn begin_read(&self) -> Option<Box<dyn WalletView + '_>> {
        match self.state.read() {
            Ok(state) => Some(Box::new(MemoryWalletView {
                state,
                spend_zero_conf_change: self.spend_zero_conf_change,
            })),
            Err(_) => {
                warn!("Wallet state lock poisoned, treating wallet as unavailable");
                None
            }
        }
    }

    fn public_key(&self, key_id: &PubkeyHash) -> Option<PublicKey> {
        self.state.read().ok()?.keys.get(key_id).cloned()
    }
}

/// In-memory chain state holding only the best height
#[derive(Debug, Default)]
pub struct MemoryChain {
    height: RwLock<u32>,
}

impl MemoryChain {
    /// Create a chain at `height`
    pub fn new(height: u32) -> Self {
        Self {
            height: RwLock::new(height),
        }
    }

    /// Move the tip to `height`; blocks while a consistent read is held
    pub fn set_height(&self, height: u32) {
        *self.height.write().unwrap_or_else(PoisonError::into_inner) = height;
    }
}

struct MemoryChainView<'a>(RwLockReadGuard<'a, u32>);

impl ChainView for MemoryChainView<'_> {
    fn height(&self) -> u32 {
        *self.0
    }
}

impl ChainState for MemoryChain {
    fn begin_read(&self) -> Option<Box<dyn ChainView + '_>> {
        match self.height.read() {
            Ok(height) => Some(Box::new(MemoryChainView(height))),
            Err(_) => {
                warn!("Chain state lock poisoned, treating chain as unavailable");
                None
            }
        }
    }
}
