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

use serde::{Deserialize, Serialize};

/// Errors that can be returned by the key and multisig operations
#[derive(Debug)]
pub enum Error {
    /// The requested network is not one of `mainnet`, `testnet` or `regtest`
    InvalidNetwork(String),
    /// The required number of signatures is not within `1..=keys`
    ThresholdOutOfRange {
        /// Number of signatures requested
        required: usize,
        /// Number of keys provided
        keys: usize,
    },
    /// A key string is not a hex-encoded secp256k1 point
    MalformedKey(String),
    /// More keys than the script type can hold
    TooManyKeys {
        /// Number of keys provided
        keys: usize,
        /// Maximum for the requested script type
        max: usize,
    },
    /// Witness scripts only accept compressed keys, the key at this position isn't
    UncompressedWitnessKey(usize),
    /// Sidechain support is not compiled in
    UnsupportedChain,
    /// No function is registered under this name
    UnknownFunction(String),
    /// The script doesn't have the expected form
    InvalidScript(String),
    /// Invalid character found in the descriptor checksum
    InvalidDescriptorCharacter(char),
    /// The provided descriptor doesn't match its checksum
    InvalidDescriptorChecksum,
    /// A tweak is not a 32 byte hex scalar below the curve order
    InvalidTweak(String),
    /// The tweaked x-only key isn't the base key tweaked with the given tweak and parity
    TweakCheckFailed,

    /// Key-related error
    Key(bitcoin::util::key::Error),
    /// Address encoding error
    Address(bitcoin::util::address::Error),
    /// A secp256k1 error
    Secp256k1(bitcoin::secp256k1::Error),
    /// Hex decoding error
    Hex(bitcoin::hashes::hex::Error),
    /// Miniscript error
    Miniscript(miniscript::Error),
    /// Error serializing or deserializing JSON data
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNetwork(network) => write!(f, "Invalid network: {}", network),
            Self::ThresholdOutOfRange { required, keys } => write!(
                f,
                "Required signatures out of range: {} of {} keys",
                required, keys
            ),
            Self::MalformedKey(key) => write!(f, "Malformed public key: {}", key),
            Self::TooManyKeys { keys, max } => {
                write!(f, "Too many keys: {} given, at most {} allowed", keys, max)
            }
            Self::UncompressedWitnessKey(index) => write!(
                f,
                "Uncompressed key at position {} can't be used in a witness script",
                index
            ),
            Self::UnsupportedChain => write!(f, "functionType not supported."),
            Self::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            Self::InvalidScript(err) => write!(f, "Invalid script: {}", err),
            Self::InvalidDescriptorCharacter(ch) => {
                write!(f, "Invalid character in descriptor: {}", ch)
            }
            Self::InvalidDescriptorChecksum => write!(f, "Descriptor checksum mismatch"),
            Self::InvalidTweak(tweak) => write!(f, "Invalid tweak: {}", tweak),
            Self::TweakCheckFailed => write!(f, "Tweaked public key check failed"),
            Self::Key(err) => write!(f, "Key error: {}", err),
            Self::Address(err) => write!(f, "Address error: {}", err),
            Self::Secp256k1(err) => write!(f, "Secp256k1 error: {}", err),
            Self::Hex(err) => write!(f, "Hex decoding error: {}", err),
            Self::Miniscript(err) => write!(f, "Miniscript error: {}", err),
            Self::Json(err) => write!(f, "JSON value convert error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Numeric code reported in an [`ErrorResponse`]
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::OutOfRange => 3,
            ErrorKind::IllegalArgument => 1,
        }
    }

    /// Classification reported in an [`ErrorResponse`]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ThresholdOutOfRange { .. } | Self::TooManyKeys { .. } | Self::Json(_) => {
                ErrorKind::OutOfRange
            }
            _ => ErrorKind::IllegalArgument,
        }
    }
}

/// Broad error classes exposed through the JSON mapping API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// One of the arguments is invalid
    IllegalArgument,
    /// A value is outside its allowed range
    OutOfRange,
}

/// Error object returned by the JSON mapping API in place of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: InnerErrorResponse,
}

/// Details of an [`ErrorResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerErrorResponse {
    /// Numeric error code
    pub code: i32,
    /// Error class
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Human readable message
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        ErrorResponse {
            error: InnerErrorResponse {
                code: err.code(),
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

macro_rules! impl_error {
    ( $from:ty, $to:ident ) => {
        impl_error!($from, $to, Error);
    };
    ( $from:ty, $to:ident, $impl_for:ty ) => {
        impl std::convert::From<$from> for $impl_for {
            fn from(err: $from) -> Self {
                <$impl_for>::$to(err)
            }
        }
    };
}

impl_error!(bitcoin::util::key::Error, Key);
impl_error!(bitcoin::util::address::Error, Address);
impl_error!(bitcoin::secp256k1::Error, Secp256k1);
impl_error!(bitcoin::hashes::hex::Error, Hex);
impl_error!(miniscript::Error, Miniscript);
impl_error!(serde_json::Error, Json);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let err = Error::ThresholdOutOfRange {
            required: 3,
            keys: 2,
        };
        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();

        assert_eq!(json["error"]["code"], 3);
        assert_eq!(json["error"]["type"], "out_of_range");
        assert_eq!(
            json["error"]["message"],
            "Required signatures out of range: 3 of 2 keys"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            Error::MalformedKey("zz".into()).kind(),
            ErrorKind::IllegalArgument
        );
        assert_eq!(Error::UnsupportedChain.code(), 1);
        assert_eq!(Error::InvalidNetwork("signet".into()).code(), 1);
        assert_eq!(Error::InvalidTweak("01".into()).code(), 1);
        assert_eq!(Error::TweakCheckFailed.kind(), ErrorKind::IllegalArgument);
    }
}
