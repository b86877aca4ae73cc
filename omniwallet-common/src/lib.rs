//! OmniWallet Common Library
//!
//! Wallet-side plumbing for building token transactions on top of Bitcoin:
//! picking the sender's spendable outputs, checking that the sender can pay
//! the minimum fee, and resolving redemption keys.
//!
//! # Modules
//!
//! - `types`: Wallet transaction and selection result types, amount constants
//! - `policy`: Script classification and the input allow-list
//! - `eligibility`: Per-output input eligibility checks
//! - `wallet`: Wallet and chain collaborator traits, in-memory backends
//! - `coin_control`: Sink for selected outpoints
//! - `selection`: Greedy coin selection for one sender address
//! - `fee`: Encoding classes and fee feasibility checks
//! - `keys`: Redemption key resolution
//! - `config`: Configuration management
//! - `logging`: Logging infrastructure
//! - `error`: Error types
//!
//! # Example
//!
//! ```
//! use omniwallet_common::{
//!     CoinSelector, EncodingConfig, FeeChecker, InputPolicy, MemoryChain, MemoryWallet,
//!     WalletStore,
//! };
//! use bitcoin::Network;
//!
//! let wallet = MemoryWallet::new(Network::Regtest);
//! let chain = MemoryChain::new(101);
//! let policy = InputPolicy::for_network(Network::Regtest);
//! let selector = CoinSelector::new(Some(&wallet as &dyn WalletStore), &chain, &policy, Network::Regtest);
//!
//! let checker = FeeChecker::new(&selector, EncodingConfig::default());
//! assert!(!checker.check_fee("mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn", 40));
//! ```

/// Common data types
pub mod types;

/// Script classification and input allow-list
pub mod policy;

/// Input eligibility checks
pub mod eligibility;

/// Wallet and chain collaborators
pub mod wallet;

/// Coin control
pub mod coin_control;

/// Coin selection
pub mod selection;

/// Fee feasibility checks
pub mod fee;

/// Redemption key resolution
pub mod keys;

/// Configuration management
pub mod config;

/// Logging functionality
pub mod logging;

/// Error types
pub mod error;

pub use coin_control::CoinControl;
pub use config::{Config, EncodingConfig, SelectionConfig};
pub use eligibility::{check_input, EligibleInput};
pub use error::{OmniWalletError, OmniWalletResult};
pub use fee::{minimum_fee, EncodingClass, FeeChecker};
pub use keys::{resolve_public_key, KeyResolutionError};
pub use policy::{InputPolicy, PolicyRule, ScriptType};
pub use selection::CoinSelector;
pub use types::{SelectionResult, WalletTx, DEFAULT_BASE_ALLOWANCE_SATS, MIN_FEE_SATS};
pub use wallet::{
    ChainState, ChainView, ConsistentRead, MemoryChain, MemoryWallet, WalletStore, WalletView,
};

// Re-export important Bitcoin types
pub use bitcoin::{Address, Amount, Network, OutPoint, PublicKey, Txid};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
