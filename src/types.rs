// Bitcoin Dev Kit
// Written in 2020 by Alekos Filini <alekos.filini@gmail.com>
//
// Copyright (c) 2020-2021 Bitcoin Dev Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Networks accepted by the request types
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin mainnet
    Mainnet,
    /// Bitcoin testnet
    Testnet,
    /// Local regression test network
    Regtest,
}

impl Network {
    /// Return the network name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(Error::InvalidNetwork(s.to_string())),
        }
    }
}

// Parsed through `FromStr` so that unknown names surface as `Error::InvalidNetwork`
impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Network::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Network> for bitcoin::Network {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
            Network::Regtest => bitcoin::Network::Regtest,
        }
    }
}

impl From<bitcoin::Network> for Network {
    fn from(network: bitcoin::Network) -> Self {
        match network {
            bitcoin::Network::Bitcoin => Network::Mainnet,
            bitcoin::Network::Regtest => Network::Regtest,
            _ => Network::Testnet,
        }
    }
}

/// How a multisig script is committed to in the output
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptHashType {
    /// Legacy pay-to-script-hash
    #[serde(rename = "p2sh")]
    P2sh,
    /// Native segwit v0 pay-to-witness-script-hash
    #[serde(rename = "p2wsh")]
    P2wsh,
    /// P2WSH nested in P2SH
    #[serde(rename = "p2sh-p2wsh")]
    P2shP2wsh,
}

impl ScriptHashType {
    /// Whether the multisig script ends up in the witness
    pub fn is_witness(&self) -> bool {
        !matches!(self, ScriptHashType::P2sh)
    }

    /// Maximum number of keys a multisig of this type can hold under standardness rules
    pub fn max_keys(&self) -> usize {
        if self.is_witness() {
            20
        } else {
            15
        }
    }
}

impl Default for ScriptHashType {
    fn default() -> Self {
        ScriptHashType::P2wsh
    }
}

/// Single-key address types
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Legacy pay-to-pubkey-hash
    #[serde(rename = "p2pkh")]
    P2pkh,
    /// Native segwit v0 pay-to-witness-pubkey-hash
    #[serde(rename = "p2wpkh")]
    P2wpkh,
    /// P2WPKH nested in P2SH
    #[serde(rename = "p2sh-p2wpkh")]
    P2shP2wpkh,
}

impl Default for AddressType {
    fn default() -> Self {
        AddressType::P2wpkh
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("testnet").unwrap(), Network::Testnet);
        assert_matches!(
            Network::from_str("liquidv1"),
            Err(Error::InvalidNetwork(n)) if n == "liquidv1"
        );
    }

    #[test]
    fn test_network_deserialize() {
        let network: Network = serde_json::from_str("\"regtest\"").unwrap();
        assert_eq!(network, Network::Regtest);

        let err = serde_json::from_str::<Network>("\"signet\"").unwrap_err();
        assert!(err.to_string().contains("Invalid network: signet"));
    }

    #[test]
    fn test_script_hash_type_names() {
        let t: ScriptHashType = serde_json::from_str("\"p2sh-p2wsh\"").unwrap();
        assert_eq!(t, ScriptHashType::P2shP2wsh);
        assert!(t.is_witness());
        assert_eq!(ScriptHashType::P2sh.max_keys(), 15);
    }
}
