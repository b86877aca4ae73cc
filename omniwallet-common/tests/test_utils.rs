//! Shared fixtures for the integration tests
#![allow(dead_code)]

use bitcoin::{Address, Network, PublicKey, TxOut, Txid};
use omniwallet_common::logging::{self, LogConfig, LogLevel};
use omniwallet_common::{InputPolicy, MemoryChain, MemoryWallet, WalletTx};
use std::str::FromStr;
use std::sync::Once;

/// Generator point, compressed (private key 1)
pub const KEY_ALICE: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
/// 2G, compressed (private key 2)
pub const KEY_BOB: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
/// 3G, compressed (private key 3)
pub const KEY_CAROL: &str = "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";
/// Generator point, uncompressed
pub const KEY_ALICE_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

static GLOBAL_TEST_INIT: Once = Once::new();

/// Initialize logging once per test binary
pub fn setup() {
    GLOBAL_TEST_INIT.call_once(|| {
        let config = LogConfig {
            level: LogLevel::Error,
            log_file: None,
            include_timestamps: false,
            include_source_location: false,
            json_format: false,
        };
        let _ = logging::init(&config);
    });
}

pub fn key(hex_key: &str) -> PublicKey {
    PublicKey::from_slice(&hex::decode(hex_key).unwrap()).unwrap()
}

/// Txid whose bytes are all `n`; txids sort by `n`
pub fn txid(n: u8) -> Txid {
    Txid::from_str(&format!("{:02x}", n).repeat(32)).unwrap()
}

pub fn pay(address: &Address, sats: u64) -> TxOut {
    TxOut {
        value: sats,
        script_pubkey: address.script_pubkey(),
    }
}

/// Regtest wallet holding Alice's and Bob's keys, chain at height 200
pub struct Fixture {
    pub wallet: MemoryWallet,
    pub chain: MemoryChain,
    pub policy: InputPolicy,
    pub alice: Address,
    pub bob: Address,
}

impl Fixture {
    pub fn new() -> Self {
        setup();
        let wallet = MemoryWallet::new(Network::Regtest);
        let alice = wallet.add_key(key(KEY_ALICE));
        let bob = wallet.add_key(key(KEY_BOB));

        Self {
            wallet,
            chain: MemoryChain::new(200),
            policy: InputPolicy::for_network(Network::Regtest),
            alice,
            bob,
        }
    }

    /// Add a confirmed transaction with the given outputs
    pub fn confirmed(&self, n: u8, outputs: Vec<TxOut>) -> Txid {
        let id = txid(n);
        self.wallet.add_transaction(WalletTx::confirmed(id, outputs, 6));
        id
    }
}
