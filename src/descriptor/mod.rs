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

//! Multisig descriptors
//!
//! This module builds `multi()` descriptors wrapped in P2SH, P2WSH or P2SH-P2WSH and decodes bare
//! multisig scripts back into their keys. Script construction and address encoding are delegated
//! to [`miniscript`] and [`bitcoin`].

use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::{self, Instruction};
use bitcoin::hashes::hex::{FromHex, ToHex};
use bitcoin::{Address, PublicKey, Script};

use log::{debug, info};
use miniscript::{Descriptor, Legacy, Miniscript, Segwitv0, Terminal};
use serde::{Deserialize, Serialize};

pub mod checksum;

pub use self::checksum::{append_checksum, get_checksum};
use crate::error::Error;
use crate::keys::parse_pubkey;
use crate::types::{AddressType, Network, ScriptHashType};

/// Request for [`build_multisig_descriptor`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MultisigRequest {
    /// Number of signatures required to spend
    #[serde(rename = "nrequired")]
    pub required_signatures: usize,
    /// Hex-encoded public keys, in script order
    #[serde(rename = "keys")]
    pub public_keys: Vec<String>,
    /// Network the address is encoded for
    #[serde(default)]
    pub network: Network,
    /// How the multisig script is committed to
    #[serde(rename = "hashType", default)]
    pub script_hash_type: ScriptHashType,
    /// Build for the Elements sidechain instead of Bitcoin
    #[serde(rename = "isElements", default)]
    pub is_elements: bool,
}

/// Response of [`build_multisig_descriptor`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MultisigResponse {
    /// Address of the output
    pub address: String,
    /// Script revealed in the `scriptSig`, for P2SH and P2SH-P2WSH
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeem_script: Option<String>,
    /// Script revealed in the witness, for P2WSH and P2SH-P2WSH
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_script: Option<String>,
    /// Output descriptor, including its checksum
    pub descriptor: String,
}

/// Build an `m`-of-`n` multisig script, its address and its descriptor
pub fn build_multisig_descriptor(request: &MultisigRequest) -> Result<MultisigResponse, Error> {
    if request.is_elements {
        return Err(Error::UnsupportedChain);
    }

    let hash_type = request.script_hash_type;
    check_threshold(request.required_signatures, request.public_keys.len())?;
    if request.public_keys.len() > hash_type.max_keys() {
        return Err(Error::TooManyKeys {
            keys: request.public_keys.len(),
            max: hash_type.max_keys(),
        });
    }

    let keys = request
        .public_keys
        .iter()
        .map(|key| parse_pubkey(key))
        .collect::<Result<Vec<_>, _>>()?;
    if hash_type.is_witness() {
        if let Some(index) = keys.iter().position(|key| !key.compressed) {
            return Err(Error::UncompressedWitnessKey(index));
        }
    }

    let m = request.required_signatures;
    let descriptor: Descriptor<PublicKey> = match hash_type {
        ScriptHashType::P2sh => {
            Descriptor::new_sh(Miniscript::<_, Legacy>::from_ast(Terminal::Multi(m, keys))?)?
        }
        ScriptHashType::P2wsh => {
            Descriptor::new_wsh(Miniscript::<_, Segwitv0>::from_ast(Terminal::Multi(m, keys))?)?
        }
        ScriptHashType::P2shP2wsh => Descriptor::new_sh_wsh(
            Miniscript::<_, Segwitv0>::from_ast(Terminal::Multi(m, keys))?,
        )?,
    };

    let multisig_script = descriptor.explicit_script()?;
    let address = descriptor.address(request.network.into())?;

    let (redeem_script, witness_script) = match hash_type {
        ScriptHashType::P2sh => (Some(script_to_hex(&multisig_script)), None),
        ScriptHashType::P2wsh => (None, Some(script_to_hex(&multisig_script))),
        ScriptHashType::P2shP2wsh => (
            Some(script_to_hex(&multisig_script.to_v0_p2wsh())),
            Some(script_to_hex(&multisig_script)),
        ),
    };

    // drop the checksum added by miniscript's formatter, if any
    let descriptor = descriptor.to_string();
    let descriptor = append_checksum(descriptor.split('#').next().unwrap_or_default())?;

    info!(
        "Built {}-of-{} {:?} multisig: {}",
        m,
        request.public_keys.len(),
        hash_type,
        address
    );

    Ok(MultisigResponse {
        address: address.to_string(),
        redeem_script,
        witness_script,
        descriptor,
    })
}

/// Request for [`append_descriptor_checksum`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppendDescriptorChecksumRequest {
    /// Descriptor, with or without a checksum
    pub descriptor: String,
    /// Treat the descriptor as an Elements descriptor
    #[serde(default)]
    pub is_elements: bool,
}

/// A descriptor string
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptorResponse {
    /// Descriptor including its checksum
    pub descriptor: String,
}

/// Append the checksum to a descriptor, verifying it first if one is already present
pub fn append_descriptor_checksum(
    request: &AppendDescriptorChecksumRequest,
) -> Result<OutputDescriptorResponse, Error> {
    if request.is_elements {
        return Err(Error::UnsupportedChain);
    }

    Ok(OutputDescriptorResponse {
        descriptor: append_checksum(&request.descriptor)?,
    })
}

fn check_threshold(required: usize, keys: usize) -> Result<(), Error> {
    if required == 0 || required > keys {
        return Err(Error::ThresholdOutOfRange { required, keys });
    }

    Ok(())
}

fn script_to_hex(script: &Script) -> String {
    script.as_bytes().to_hex()
}

/// Request for [`get_addresses_from_multisig`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetAddressesFromMultisigRequest {
    /// Decode for the Elements sidechain instead of Bitcoin
    #[serde(default)]
    pub is_elements: bool,
    /// Hex-encoded bare multisig script
    pub redeem_script: String,
    /// Network the addresses are encoded for
    #[serde(default)]
    pub network: Network,
    /// Type of the single-key addresses to return
    #[serde(default)]
    pub hash_type: AddressType,
}

/// Response of [`get_addresses_from_multisig`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetAddressesFromMultisigResponse {
    /// One address per key, in script order
    pub addresses: Vec<String>,
    /// Hex-encoded keys, in script order
    pub pubkeys: Vec<String>,
    /// Number of signatures required by the script
    pub require_num: usize,
}

/// Decode a multisig script and return a single-key address for each of its keys
pub fn get_addresses_from_multisig(
    request: &GetAddressesFromMultisigRequest,
) -> Result<GetAddressesFromMultisigResponse, Error> {
    if request.is_elements {
        return Err(Error::UnsupportedChain);
    }

    let script = Script::from(Vec::<u8>::from_hex(&request.redeem_script)?);
    let (require_num, keys) = parse_multisig_script(&script)?;
    debug!("Decoded {}-of-{} multisig script", require_num, keys.len());

    let network: bitcoin::Network = request.network.into();
    let addresses = keys
        .iter()
        .map(|key| match request.hash_type {
            AddressType::P2pkh => Ok(Address::p2pkh(key, network)),
            AddressType::P2wpkh => Address::p2wpkh(key, network),
            AddressType::P2shP2wpkh => Address::p2shwpkh(key, network),
        })
        .map(|address| address.map(|a| a.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GetAddressesFromMultisigResponse {
        addresses,
        pubkeys: keys.iter().map(|key| key.to_string()).collect(),
        require_num,
    })
}

/// Split a `<m> <key>... <n> OP_CHECKMULTISIG` script into its threshold and keys
pub fn parse_multisig_script(script: &Script) -> Result<(usize, Vec<PublicKey>), Error> {
    let instructions = script
        .instructions()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::InvalidScript(e.to_string()))?;

    let (required, rest) = instructions
        .split_first()
        .ok_or_else(|| Error::InvalidScript("empty script".to_string()))?;
    let (last, rest) = rest
        .split_last()
        .ok_or_else(|| Error::InvalidScript("missing OP_CHECKMULTISIG".to_string()))?;
    if *last != Instruction::Op(opcodes::all::OP_CHECKMULTISIG) {
        return Err(Error::InvalidScript("missing OP_CHECKMULTISIG".to_string()));
    }
    let (total, keys) = rest
        .split_last()
        .ok_or_else(|| Error::InvalidScript("missing key count".to_string()))?;

    let required = read_number(required)?;
    let total = read_number(total)?;
    let keys = keys
        .iter()
        .map(|instruction| match instruction {
            Instruction::PushBytes(bytes) => {
                PublicKey::from_slice(bytes).map_err(|_| Error::MalformedKey(bytes.to_hex()))
            }
            Instruction::Op(op) => Err(Error::InvalidScript(format!(
                "unexpected {:?} in place of a key",
                op
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if keys.len() != total {
        return Err(Error::InvalidScript(format!(
            "script declares {} keys but contains {}",
            total,
            keys.len()
        )));
    }
    check_threshold(required, total)?;

    Ok((required, keys))
}

fn read_number(instruction: &Instruction<'_>) -> Result<usize, Error> {
    match *instruction {
        Instruction::Op(op) => (1..=16u8)
            .find(|n| opcodes::All::from(0x50 + n) == op)
            .map(usize::from)
            .ok_or_else(|| Error::InvalidScript(format!("expected a number, found {:?}", op))),
        Instruction::PushBytes(bytes) => match script::read_scriptint(bytes) {
            Ok(n) if n >= 0 => Ok(n as usize),
            _ => Err(Error::InvalidScript(format!(
                "expected a number, found 0x{}",
                bytes.to_hex()
            ))),
        },
    }
}
