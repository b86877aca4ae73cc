//! Input eligibility checks
//!
//! Decides whether a single output may be used as an input of a token
//! transaction at a given height, and which address it pays to.

use bitcoin::{Address, Network, PublicKey, Script, TxOut};
use log::trace;

use crate::policy::{InputPolicy, ScriptType};

/// An output that passed the eligibility checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleInput {
    /// Classified script type
    pub script_type: ScriptType,
    /// Address the output pays to
    pub destination: Address,
}

/// Check whether `txout` qualifies as a transaction input at `height`
///
/// Returns `None` if the script is non-standard, its type is not allowed at
/// this height, or no destination address can be derived from it.
pub fn check_input(
    txout: &TxOut,
    height: u32,
    policy: &InputPolicy,
    network: Network,
) -> Option<EligibleInput> {
    let script = txout.script_pubkey.as_script();

    let Some(script_type) = ScriptType::classify(script) else {
        trace!("Skipping output with non-standard script");
        return None;
    };
    if !policy.is_allowed(script_type, height) {
        trace!("Script type {} not allowed as input at height {}", script_type, height);
        return None;
    }
    let Some(destination) = extract_destination(script, script_type, network) else {
        trace!("No destination for {} output", script_type);
        return None;
    };

    Some(EligibleInput {
        script_type,
        destination,
    })
}

/// Derive the address an output script pays to
///
/// Bare public key outputs resolve to the P2PKH address of their key.
/// Multisig and data carrier outputs have no single destination.
pub fn extract_destination(
    script: &Script,
    script_type: ScriptType,
    network: Network,
) -> Option<Address> {
    match script_type {
        ScriptType::Multisig | ScriptType::NullData => None,
        ScriptType::PubKey => {
            p2pk_key(script).map(|key| Address::p2pkh(&key, network))
        }
        _ => Address::from_script(script, network).ok(),
    }
}

// <push len> <key> OP_CHECKSIG
fn p2pk_key(script: &Script) -> Option<PublicKey> {
    let bytes = script.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    PublicKey::from_slice(&bytes[1..bytes.len() - 1]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::ScriptBuf;

    const KEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn txout(script: ScriptBuf) -> TxOut {
        TxOut {
            value: 50_000,
            script_pubkey: script,
        }
    }

    #[test]
    fn bare_key_resolves_to_its_p2pkh_address() {
        let key = PublicKey::from_slice(&hex::decode(KEY).unwrap()).unwrap();
        let p2pk = ScriptBuf::new_p2pk(&key);

        let destination = extract_destination(&p2pk, ScriptType::PubKey, Network::Regtest);
        assert_eq!(destination, Some(Address::p2pkh(&key, Network::Regtest)));
    }

    #[test]
    fn bare_key_is_not_an_allowed_input() {
        let key = PublicKey::from_slice(&hex::decode(KEY).unwrap()).unwrap();
        let policy = InputPolicy::for_network(Network::Regtest);

        assert!(check_input(&txout(ScriptBuf::new_p2pk(&key)), 10, &policy, Network::Regtest).is_none());
    }

    #[test]
    fn p2pkh_is_eligible() {
        let key = PublicKey::from_slice(&hex::decode(KEY).unwrap()).unwrap();
        let address = Address::p2pkh(&key, Network::Regtest);
        let policy = InputPolicy::for_network(Network::Regtest);

        let eligible = check_input(&txout(address.script_pubkey()), 0, &policy, Network::Regtest)
            .expect("p2pkh output should be eligible");
        assert_eq!(eligible.script_type, ScriptType::PubKeyHash);
        assert_eq!(eligible.destination, address);
    }
}
