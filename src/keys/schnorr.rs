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

//! X-only (BIP-340) public keys and key tweaking
//!
//! Public keys are returned as 32 byte hex strings together with the parity of the full point's
//! y coordinate: `parity` is `true` when y is odd.

use std::convert::TryInto;

use bitcoin::hashes::hex::{FromHex, ToHex};
use bitcoin::secp256k1::{KeyPair, Parity, Scalar, XOnlyPublicKey};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{parse_privkey, parse_pubkey, PubkeyData, SecpCtx};
use crate::error::Error;

/// A private key, hex or WIF
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchnorrPrivkeyData {
    /// Private key, either hex or WIF
    pub privkey: String,
}

/// An x-only public key with its parity
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchnorrPubkeyData {
    /// Hex-encoded 32 byte x-only public key
    pub pubkey: String,
    /// Whether the y coordinate of the full point is odd
    pub parity: bool,
}

/// A private key and the tweak to add to it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TweakPrivkeyData {
    /// Private key, either hex or WIF
    pub privkey: String,
    /// Hex-encoded 32 byte tweak
    pub tweak: String,
}

/// An x-only public key and the tweak to add to it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TweakPubkeyData {
    /// Hex-encoded 32 byte x-only public key
    pub pubkey: String,
    /// Hex-encoded 32 byte tweak
    pub tweak: String,
}

/// Tweaked key pair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchnorrKeyPairData {
    /// Hex-encoded tweaked x-only public key
    pub pubkey: String,
    /// Hex-encoded tweaked private key
    pub privkey: String,
    /// Whether the y coordinate of the tweaked point is odd
    pub parity: bool,
}

/// Request for [`check_tweaked_schnorr_pubkey`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckTweakedSchnorrPubkeyRequest {
    /// The tweaked x-only public key
    pub pubkey: String,
    /// Parity of the tweaked key
    pub parity: bool,
    /// The x-only public key before tweaking
    pub base_pubkey: String,
    /// Hex-encoded 32 byte tweak
    pub tweak: String,
}

/// Response of [`check_tweaked_schnorr_pubkey`]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TweakCheckResponse {
    /// Always `true`, a failed check is returned as [`Error::TweakCheckFailed`]
    pub success: bool,
}

fn pubkey_data(pubkey: XOnlyPublicKey, parity: Parity) -> SchnorrPubkeyData {
    SchnorrPubkeyData {
        pubkey: pubkey.to_string(),
        parity: parity == Parity::Odd,
    }
}

fn parse_xonly_pubkey(key: &str) -> Result<XOnlyPublicKey, Error> {
    let malformed = || Error::MalformedKey(key.to_string());

    let bytes = Vec::<u8>::from_hex(key).map_err(|_| malformed())?;
    XOnlyPublicKey::from_slice(&bytes).map_err(|_| malformed())
}

fn parse_tweak(tweak: &str) -> Result<Scalar, Error> {
    let invalid = || Error::InvalidTweak(tweak.to_string());

    let bytes: [u8; 32] = Vec::<u8>::from_hex(tweak)
        .map_err(|_| invalid())?
        .try_into()
        .map_err(|_| invalid())?;
    Scalar::from_be_bytes(bytes).map_err(|_| invalid())
}

/// Derive the x-only public key of a private key
pub fn get_schnorr_pubkey_from_privkey(
    request: &SchnorrPrivkeyData,
) -> Result<SchnorrPubkeyData, Error> {
    let secp = SecpCtx::new();
    let privkey = parse_privkey(&request.privkey, true)?;
    let (pubkey, parity) = privkey.inner.x_only_public_key(&secp);

    Ok(pubkey_data(pubkey, parity))
}

/// Drop the y coordinate of a compressed or uncompressed public key
pub fn get_schnorr_pubkey_from_pubkey(request: &PubkeyData) -> Result<SchnorrPubkeyData, Error> {
    let pubkey = parse_pubkey(&request.pubkey)?;
    let (pubkey, parity) = pubkey.inner.x_only_public_key();

    Ok(pubkey_data(pubkey, parity))
}

/// Add a tweak to a private key, returning the tweaked key pair
///
/// The private key is negated first when its public key has an odd y coordinate, so that the
/// result matches [`tweak_add_schnorr_pubkey_from_pubkey`] on its x-only public key.
pub fn tweak_add_schnorr_pubkey_from_privkey(
    request: &TweakPrivkeyData,
) -> Result<SchnorrKeyPairData, Error> {
    let secp = SecpCtx::new();
    let privkey = parse_privkey(&request.privkey, true)?;
    let tweak = parse_tweak(&request.tweak)?;

    let keypair = KeyPair::from_secret_key(&secp, &privkey.inner).add_xonly_tweak(&secp, &tweak)?;
    let (pubkey, parity) = keypair.x_only_public_key();
    debug!("Tweaked x-only key {}", pubkey);

    Ok(SchnorrKeyPairData {
        pubkey: pubkey.to_string(),
        privkey: keypair.secret_key().secret_bytes()[..].to_hex(),
        parity: parity == Parity::Odd,
    })
}

/// Add a tweak to an x-only public key
pub fn tweak_add_schnorr_pubkey_from_pubkey(
    request: &TweakPubkeyData,
) -> Result<SchnorrPubkeyData, Error> {
    let secp = SecpCtx::new();
    let pubkey = parse_xonly_pubkey(&request.pubkey)?;
    let tweak = parse_tweak(&request.tweak)?;

    let (pubkey, parity) = pubkey.add_tweak(&secp, &tweak)?;

    Ok(pubkey_data(pubkey, parity))
}

/// Check that `pubkey` and `parity` are the result of tweaking `base_pubkey` with `tweak`
pub fn check_tweaked_schnorr_pubkey(
    request: &CheckTweakedSchnorrPubkeyRequest,
) -> Result<TweakCheckResponse, Error> {
    let secp = SecpCtx::new();
    let tweaked = parse_xonly_pubkey(&request.pubkey)?;
    let base = parse_xonly_pubkey(&request.base_pubkey)?;
    let tweak = parse_tweak(&request.tweak)?;
    let parity = if request.parity {
        Parity::Odd
    } else {
        Parity::Even
    };

    if !base.tweak_add_check(&secp, &tweaked, parity, tweak) {
        return Err(Error::TweakCheckFailed);
    }

    Ok(TweakCheckResponse { success: true })
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    const ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const TWO: &str = "0000000000000000000000000000000000000000000000000000000000000002";
    // curve order minus one, its public key is -G
    const MINUS_ONE: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140";
    const G_X: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const TWO_G_X: &str = "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

    #[test]
    fn test_schnorr_pubkey_from_privkey() {
        let res = get_schnorr_pubkey_from_privkey(&SchnorrPrivkeyData {
            privkey: ONE.to_string(),
        })
        .unwrap();
        assert_eq!(res.pubkey, G_X);
        assert!(!res.parity);

        let res = get_schnorr_pubkey_from_privkey(&SchnorrPrivkeyData {
            privkey: MINUS_ONE.to_string(),
        })
        .unwrap();
        assert_eq!(res.pubkey, G_X);
        assert!(res.parity);
    }

    #[test]
    fn test_schnorr_pubkey_from_pubkey() {
        let even = get_schnorr_pubkey_from_pubkey(&PubkeyData {
            pubkey: format!("02{}", G_X),
        })
        .unwrap();
        assert_eq!(even.pubkey, G_X);
        assert!(!even.parity);

        let odd = get_schnorr_pubkey_from_pubkey(&PubkeyData {
            pubkey: format!("03{}", G_X),
        })
        .unwrap();
        assert_eq!(odd.pubkey, G_X);
        assert!(odd.parity);
    }

    #[test]
    fn test_tweak_add_from_privkey() {
        let res = tweak_add_schnorr_pubkey_from_privkey(&TweakPrivkeyData {
            privkey: ONE.to_string(),
            tweak: ONE.to_string(),
        })
        .unwrap();
        assert_eq!(res.pubkey, TWO_G_X);
        assert_eq!(res.privkey, TWO);
        assert!(!res.parity);
    }

    #[test]
    fn test_tweak_add_from_odd_privkey() {
        // -1 is negated to 1 before adding the tweak
        let res = tweak_add_schnorr_pubkey_from_privkey(&TweakPrivkeyData {
            privkey: MINUS_ONE.to_string(),
            tweak: ONE.to_string(),
        })
        .unwrap();
        assert_eq!(res.pubkey, TWO_G_X);
        assert_eq!(res.privkey, TWO);
    }

    #[test]
    fn test_tweak_add_from_pubkey() {
        let res = tweak_add_schnorr_pubkey_from_pubkey(&TweakPubkeyData {
            pubkey: G_X.to_string(),
            tweak: ONE.to_string(),
        })
        .unwrap();
        assert_eq!(res.pubkey, TWO_G_X);
        assert!(!res.parity);
    }

    #[test]
    fn test_check_tweaked_pubkey() {
        let mut request = CheckTweakedSchnorrPubkeyRequest {
            pubkey: TWO_G_X.to_string(),
            parity: false,
            base_pubkey: G_X.to_string(),
            tweak: ONE.to_string(),
        };
        assert!(check_tweaked_schnorr_pubkey(&request).unwrap().success);

        request.parity = true;
        assert_matches!(
            check_tweaked_schnorr_pubkey(&request),
            Err(Error::TweakCheckFailed)
        );
    }

    #[test]
    fn test_invalid_tweak() {
        for tweak in &["01", "zz", "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"] {
            assert_matches!(
                tweak_add_schnorr_pubkey_from_pubkey(&TweakPubkeyData {
                    pubkey: G_X.to_string(),
                    tweak: tweak.to_string(),
                }),
                Err(Error::InvalidTweak(_))
            );
        }
    }

    #[test]
    fn test_malformed_xonly_pubkey() {
        assert_matches!(
            tweak_add_schnorr_pubkey_from_pubkey(&TweakPubkeyData {
                pubkey: format!("02{}", G_X),
                tweak: ONE.to_string(),
            }),
            Err(Error::MalformedKey(_))
        );
    }
}
