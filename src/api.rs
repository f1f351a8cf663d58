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

//! JSON mapping API
//!
//! Exposes every operation of the crate by name, taking and returning JSON strings. Failures are
//! returned as an [`ErrorResponse`] object instead of a response:
//!
//! ```
//! use keyapi::api::JsonMappingApi;
//!
//! let api = JsonMappingApi::new();
//! let response = api.call("CreateMultisig", r#"{"nrequired":3,"keys":[],"network":"testnet"}"#);
//! assert!(response.contains("\"error\""));
//! ```

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorResponse};
use crate::types::Network;
use crate::{descriptor, functions, keys};

type RequestFunction = fn(&str) -> Result<String, Error>;
type ResponseOnlyFunction = fn() -> Result<String, Error>;

/// Deserialize a request, run `call_function` on it and serialize the response
pub fn execute_json_api<Req, Res, F>(request_message: &str, call_function: F) -> Result<String, Error>
where
    Req: DeserializeOwned,
    Res: Serialize,
    F: FnOnce(&Req) -> Result<Res, Error>,
{
    let request: Value = serde_json::from_str(request_message)?;
    check_network(&request)?;

    let request: Req = serde_json::from_value(request)?;
    let response = call_function(&request)?;

    Ok(serde_json::to_string(&response)?)
}

// an unknown `network` name is an invalid argument, not a JSON conversion failure
fn check_network(request: &Value) -> Result<(), Error> {
    match request.get("network").and_then(Value::as_str) {
        Some(network) => network.parse::<Network>().map(|_| ()),
        None => Ok(()),
    }
}

/// Run a function that takes no request and serialize its response
pub fn execute_json_response_only_api<Res, F>(call_function: F) -> Result<String, Error>
where
    Res: Serialize,
    F: FnOnce() -> Res,
{
    Ok(serde_json::to_string(&call_function())?)
}

/// Registry of the functions callable by name
pub struct JsonMappingApi {
    request_map: BTreeMap<&'static str, RequestFunction>,
    response_only_map: BTreeMap<&'static str, ResponseOnlyFunction>,
}

impl JsonMappingApi {
    /// Create a registry with every function loaded
    pub fn new() -> Self {
        let mut api = JsonMappingApi {
            request_map: BTreeMap::new(),
            response_only_map: BTreeMap::new(),
        };
        api.load_functions();

        api
    }

    fn load_functions(&mut self) {
        self.response_only_map.insert("GetSupportedFunction", || {
            execute_json_response_only_api(functions::list_supported_functions)
        });

        self.request_map.insert("CreateKeyPair", |msg| {
            execute_json_api(msg, keys::generate_key_pair)
        });
        self.request_map.insert("GetPrivkeyFromWif", |msg| {
            execute_json_api(msg, keys::get_privkey_from_wif)
        });
        self.request_map.insert("GetPrivkeyWif", |msg| {
            execute_json_api(msg, keys::get_privkey_wif)
        });
        self.request_map.insert("GetPubkeyFromPrivkey", |msg| {
            execute_json_api(msg, keys::get_pubkey_from_privkey)
        });
        self.request_map.insert("GetCompressedPubkey", |msg| {
            execute_json_api(msg, keys::get_compressed_pubkey)
        });
        self.request_map.insert("GetUncompressedPubkey", |msg| {
            execute_json_api(msg, keys::get_uncompressed_pubkey)
        });
        self.request_map.insert("GetSchnorrPubkeyFromPrivkey", |msg| {
            execute_json_api(msg, keys::schnorr::get_schnorr_pubkey_from_privkey)
        });
        self.request_map.insert("GetSchnorrPubkeyFromPubkey", |msg| {
            execute_json_api(msg, keys::schnorr::get_schnorr_pubkey_from_pubkey)
        });
        self.request_map.insert("TweakAddSchnorrPubkeyFromPrivkey", |msg| {
            execute_json_api(msg, keys::schnorr::tweak_add_schnorr_pubkey_from_privkey)
        });
        self.request_map.insert("TweakAddSchnorrPubkeyFromPubkey", |msg| {
            execute_json_api(msg, keys::schnorr::tweak_add_schnorr_pubkey_from_pubkey)
        });
        self.request_map.insert("CheckTweakedSchnorrPubkey", |msg| {
            execute_json_api(msg, keys::schnorr::check_tweaked_schnorr_pubkey)
        });
        self.request_map.insert("CreateMultisig", |msg| {
            execute_json_api(msg, descriptor::build_multisig_descriptor)
        });
        self.request_map.insert("GetAddressesFromMultisig", |msg| {
            execute_json_api(msg, descriptor::get_addresses_from_multisig)
        });
        self.request_map.insert("AppendDescriptorChecksum", |msg| {
            execute_json_api(msg, descriptor::append_descriptor_checksum)
        });
    }

    /// Names of all the registered functions, sorted
    pub fn function_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .request_map
            .keys()
            .chain(self.response_only_map.keys())
            .copied()
            .collect();
        names.sort_unstable();

        names
    }

    /// Call a function by name, returning either the typed error or the JSON response
    ///
    /// Functions that don't take a request ignore `request_message`.
    pub fn call_function(&self, name: &str, request_message: &str) -> Result<String, Error> {
        debug!("Calling {}", name);

        if let Some(function) = self.response_only_map.get(name) {
            return function();
        }

        match self.request_map.get(name) {
            Some(function) => function(request_message),
            None => Err(Error::UnknownFunction(name.to_string())),
        }
    }

    /// Call a function by name, returning its JSON response or a JSON [`ErrorResponse`]
    pub fn call(&self, name: &str, request_message: &str) -> String {
        match self.call_function(name, request_message) {
            Ok(response) => response,
            Err(err) => {
                warn!("{} failed: {}", name, err);
                serde_json::to_string(&ErrorResponse::from(&err)).unwrap_or_else(|_| err.to_string())
            }
        }
    }
}

impl Default for JsonMappingApi {
    fn default() -> Self {
        Self::new()
    }
}
