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

//! Key pairs and single-key conversions
//!
//! Every operation takes a plain request value and returns a plain response value, so that the
//! same functions can be called directly or through the [`api`](crate::api) JSON mapping.

use bitcoin::hashes::hex::{FromHex, ToHex};
use bitcoin::secp256k1::{self, All, Secp256k1};
use bitcoin::{PrivateKey, PublicKey};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Network;

pub mod schnorr;

pub(crate) type SecpCtx = Secp256k1<All>;

fn default_true() -> bool {
    true
}

/// Options for generating a [`PrivateKey`]
///
/// Defaults to creating compressed mainnet keys
#[derive(Debug, Copy, Clone)]
pub struct PrivateKeyGenerateOptions {
    /// Whether the generated key should be "compressed" or not
    pub compressed: bool,
    /// Network the key will be encoded for
    pub network: Network,
}

impl Default for PrivateKeyGenerateOptions {
    fn default() -> Self {
        PrivateKeyGenerateOptions {
            compressed: true,
            network: Network::Mainnet,
        }
    }
}

/// Trait for keys that can be generated
pub trait GeneratableKey: Sized {
    /// Type specifying the amount of entropy required e.g. `[u8;32]`
    type Entropy: AsMut<[u8]> + Default;

    /// Extra options required by the `generate_with_entropy`
    type Options;
    /// Returned error in case of failure
    type Error: std::fmt::Debug;

    /// Generate a key given the extra options and the entropy
    fn generate_with_entropy(
        options: Self::Options,
        entropy: Self::Entropy,
    ) -> Result<Self, Self::Error>;

    /// Generate a key given the options with a random entropy
    fn generate(options: Self::Options) -> Result<Self, Self::Error> {
        use rand::{thread_rng, Rng};

        let mut entropy = Self::Entropy::default();
        thread_rng().fill(entropy.as_mut());
        Self::generate_with_entropy(options, entropy)
    }
}

impl GeneratableKey for PrivateKey {
    type Entropy = [u8; secp256k1::constants::SECRET_KEY_SIZE];

    type Options = PrivateKeyGenerateOptions;
    type Error = secp256k1::Error;

    fn generate_with_entropy(
        options: Self::Options,
        entropy: Self::Entropy,
    ) -> Result<Self, Self::Error> {
        let inner = secp256k1::SecretKey::from_slice(&entropy)?;

        Ok(PrivateKey {
            compressed: options.compressed,
            network: options.network.into(),
            inner,
        })
    }
}

/// Request for [`generate_key_pair`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairRequest {
    /// Also return the private key in Wallet Import Format
    #[serde(default = "default_true")]
    pub wif: bool,
    /// Network the key is generated for
    #[serde(default)]
    pub network: Network,
    /// Use the compressed public key form
    #[serde(default = "default_true")]
    pub is_compressed: bool,
}

impl Default for KeyPairRequest {
    fn default() -> Self {
        KeyPairRequest {
            wif: true,
            network: Network::default(),
            is_compressed: true,
        }
    }
}

/// Response of [`generate_key_pair`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyPairResponse {
    /// Hex-encoded private key
    pub privkey: String,
    /// Hex-encoded public key
    pub pubkey: String,
    /// WIF-encoded private key, only present when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wif: Option<String>,
}

/// Generate a fresh private/public key pair
pub fn generate_key_pair(request: &KeyPairRequest) -> Result<KeyPairResponse, Error> {
    let secp = SecpCtx::new();

    let privkey = PrivateKey::generate(PrivateKeyGenerateOptions {
        compressed: request.is_compressed,
        network: request.network,
    })?;
    let pubkey = privkey.public_key(&secp);

    debug!(
        "Generated key pair on {} (compressed: {})",
        request.network, request.is_compressed
    );

    Ok(KeyPairResponse {
        privkey: privkey_to_hex(&privkey),
        pubkey: pubkey.to_string(),
        wif: if request.wif {
            Some(privkey.to_wif())
        } else {
            None
        },
    })
}

/// A WIF-encoded private key
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PrivkeyWifData {
    /// WIF string
    pub wif: String,
}

/// A hex-encoded private key with its encoding metadata
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivkeyHexData {
    /// Hex-encoded 32 byte secret
    pub hex: String,
    /// Network of the key
    #[serde(default)]
    pub network: Network,
    /// Whether the key is used with compressed public keys
    #[serde(default = "default_true")]
    pub is_compressed: bool,
}

/// Decode a WIF private key
pub fn get_privkey_from_wif(request: &PrivkeyWifData) -> Result<PrivkeyHexData, Error> {
    let privkey = PrivateKey::from_wif(&request.wif)?;

    Ok(PrivkeyHexData {
        hex: privkey_to_hex(&privkey),
        network: privkey.network.into(),
        is_compressed: privkey.compressed,
    })
}

/// Encode a hex private key as WIF
pub fn get_privkey_wif(request: &PrivkeyHexData) -> Result<PrivkeyWifData, Error> {
    let inner = secp256k1::SecretKey::from_slice(&Vec::<u8>::from_hex(&request.hex)?)?;
    let privkey = PrivateKey {
        compressed: request.is_compressed,
        network: request.network.into(),
        inner,
    };

    Ok(PrivkeyWifData {
        wif: privkey.to_wif(),
    })
}

/// Request for [`get_pubkey_from_privkey`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetPubkeyFromPrivkeyRequest {
    /// Private key, either hex or WIF
    pub privkey: String,
    /// Public key form for hex private keys. WIF keys carry their own flag
    #[serde(default = "default_true")]
    pub is_compressed: bool,
}

/// A hex-encoded public key
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PubkeyData {
    /// Hex-encoded public key
    pub pubkey: String,
}

/// Derive the public key of a hex or WIF private key
pub fn get_pubkey_from_privkey(request: &GetPubkeyFromPrivkeyRequest) -> Result<PubkeyData, Error> {
    let secp = SecpCtx::new();
    let privkey = parse_privkey(&request.privkey, request.is_compressed)?;

    Ok(PubkeyData {
        pubkey: privkey.public_key(&secp).to_string(),
    })
}

/// Parse a private key given either as 32 byte hex or as WIF
///
/// `compressed` only applies to hex keys, WIF keys carry their own flag.
pub(crate) fn parse_privkey(key: &str, compressed: bool) -> Result<PrivateKey, Error> {
    match Vec::<u8>::from_hex(key) {
        Ok(bytes) if bytes.len() == secp256k1::constants::SECRET_KEY_SIZE => Ok(PrivateKey {
            compressed,
            network: bitcoin::Network::Bitcoin,
            inner: secp256k1::SecretKey::from_slice(&bytes)?,
        }),
        _ => Ok(PrivateKey::from_wif(key)?),
    }
}

/// Convert a public key to its 33 byte compressed form
pub fn get_compressed_pubkey(request: &PubkeyData) -> Result<PubkeyData, Error> {
    let mut pubkey = parse_pubkey(&request.pubkey)?;
    pubkey.compressed = true;

    Ok(PubkeyData {
        pubkey: pubkey.to_string(),
    })
}

/// Convert a public key to its 65 byte uncompressed form
pub fn get_uncompressed_pubkey(request: &PubkeyData) -> Result<PubkeyData, Error> {
    let mut pubkey = parse_pubkey(&request.pubkey)?;
    pubkey.compressed = false;

    Ok(PubkeyData {
        pubkey: pubkey.to_string(),
    })
}

/// Parse a hex-encoded public key
///
/// Fails with [`Error::MalformedKey`] if the string has odd length, contains non-hex characters
/// or doesn't encode a point on the curve.
pub fn parse_pubkey(key: &str) -> Result<PublicKey, Error> {
    if key.len() % 2 != 0 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::MalformedKey(key.to_string()));
    }

    let bytes = Vec::<u8>::from_hex(key).map_err(|_| Error::MalformedKey(key.to_string()))?;
    PublicKey::from_slice(&bytes).map_err(|_| Error::MalformedKey(key.to_string()))
}

pub(crate) fn privkey_to_hex(privkey: &PrivateKey) -> String {
    privkey.inner.secret_bytes()[..].to_hex()
}

#[cfg(test)]
pub mod test {
    use assert_matches::assert_matches;

    use super::*;

    pub const TEST_ENTROPY: [u8; 32] = [0xAA; 32];

    const ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const G_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    #[test]
    fn test_keys_generate_with_entropy() {
        let privkey = PrivateKey::generate_with_entropy(
            PrivateKeyGenerateOptions::default(),
            TEST_ENTROPY,
        )
        .unwrap();

        assert!(privkey.compressed);
        assert_eq!(privkey.network, bitcoin::Network::Bitcoin);
        assert_eq!(privkey_to_hex(&privkey), "aa".repeat(32));
    }

    #[test]
    fn test_keys_generate_zero_entropy() {
        let res =
            PrivateKey::generate_with_entropy(PrivateKeyGenerateOptions::default(), [0x00; 32]);
        assert!(res.is_err());
    }

    #[test]
    fn test_key_pair_compression_flag() {
        for network in &[Network::Mainnet, Network::Testnet, Network::Regtest] {
            for is_compressed in &[true, false] {
                let res = generate_key_pair(&KeyPairRequest {
                    wif: false,
                    network: *network,
                    is_compressed: *is_compressed,
                })
                .unwrap();

                let pubkey = parse_pubkey(&res.pubkey).unwrap();
                assert_eq!(pubkey.compressed, *is_compressed);
                assert_eq!(res.privkey.len(), 64);
                assert_eq!(res.wif, None);
            }
        }
    }

    #[test]
    fn test_key_pair_wif_roundtrip() {
        let res = generate_key_pair(&KeyPairRequest {
            wif: true,
            network: Network::Testnet,
            is_compressed: true,
        })
        .unwrap();

        let wif = res.wif.unwrap();
        assert!(wif.starts_with('c'));

        let decoded = get_privkey_from_wif(&PrivkeyWifData { wif }).unwrap();
        assert_eq!(decoded.hex, res.privkey);
        assert_eq!(decoded.network, Network::Testnet);
        assert!(decoded.is_compressed);
    }

    #[test]
    fn test_key_pair_pubkey_matches_privkey() {
        let res = generate_key_pair(&KeyPairRequest::default()).unwrap();

        let derived = get_pubkey_from_privkey(&GetPubkeyFromPrivkeyRequest {
            privkey: res.wif.unwrap(),
            is_compressed: false,
        })
        .unwrap();
        assert_eq!(derived.pubkey, res.pubkey);
    }

    #[test]
    fn test_privkey_wif_known_vectors() {
        let compressed = get_privkey_wif(&PrivkeyHexData {
            hex: ONE.to_string(),
            network: Network::Mainnet,
            is_compressed: true,
        })
        .unwrap();
        assert_eq!(
            compressed.wif,
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );

        let uncompressed = get_privkey_wif(&PrivkeyHexData {
            hex: ONE.to_string(),
            network: Network::Mainnet,
            is_compressed: false,
        })
        .unwrap();
        assert_eq!(
            uncompressed.wif,
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf"
        );

        let decoded = get_privkey_from_wif(&uncompressed).unwrap();
        assert_eq!(decoded.hex, ONE);
        assert!(!decoded.is_compressed);
    }

    #[test]
    fn test_pubkey_from_hex_privkey() {
        let res = get_pubkey_from_privkey(&GetPubkeyFromPrivkeyRequest {
            privkey: ONE.to_string(),
            is_compressed: true,
        })
        .unwrap();
        assert_eq!(res.pubkey, G_COMPRESSED);
    }

    #[test]
    fn test_pubkey_compression_conversion() {
        let uncompressed = get_uncompressed_pubkey(&PubkeyData {
            pubkey: G_COMPRESSED.to_string(),
        })
        .unwrap();
        assert_eq!(uncompressed.pubkey, G_UNCOMPRESSED);

        let compressed = get_compressed_pubkey(&uncompressed).unwrap();
        assert_eq!(compressed.pubkey, G_COMPRESSED);
    }

    #[test]
    fn test_parse_pubkey_malformed() {
        assert_matches!(parse_pubkey("020"), Err(Error::MalformedKey(_)));
        assert_matches!(
            parse_pubkey(&format!("02{}", "zz".repeat(32))),
            Err(Error::MalformedKey(_))
        );
        assert_matches!(
            parse_pubkey(&format!("05{}", &G_COMPRESSED[2..])),
            Err(Error::MalformedKey(_))
        );
        assert!(parse_pubkey(G_COMPRESSED).is_ok());
    }

    #[test]
    fn test_key_pair_request_defaults() {
        let req: KeyPairRequest = serde_json::from_str("{\"network\":\"testnet\"}").unwrap();
        assert!(req.wif);
        assert!(req.is_compressed);
        assert_eq!(req.network, Network::Testnet);
    }
}
