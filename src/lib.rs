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

// only enables the `doc_cfg` feature when
// the `docsrs` configuration attribute is defined
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A request/response API for Bitcoin keys and multisig descriptors.
//!
//! Every operation takes a plain request value and returns a plain response value or an
//! [`Error`]. The same operations are exposed by name, with JSON requests and responses, through
//! [`api::JsonMappingApi`].
//!
//! ## Example
//!
//! ```
//! use keyapi::descriptor::{build_multisig_descriptor, MultisigRequest};
//! use keyapi::{Network, ScriptHashType};
//!
//! let response = build_multisig_descriptor(&MultisigRequest {
//!     required_signatures: 2,
//!     public_keys: vec![
//!         "0205ffcdde75f262d66ada3dd877c7471f8f8ee9ee24d917c3e18d01cee458bafe".to_string(),
//!         "02be61f4350b4ae7544f99649a917f48ba16cf48c983ac1599774958d88ad17ec5".to_string(),
//!     ],
//!     network: Network::Testnet,
//!     script_hash_type: ScriptHashType::P2wsh,
//!     is_elements: false,
//! })?;
//!
//! assert!(response.address.starts_with("tb1q"));
//! # Ok::<_, keyapi::Error>(())
//! ```

pub extern crate bitcoin;
pub extern crate miniscript;
extern crate serde;
extern crate serde_json;

#[macro_use]
pub(crate) mod error;
pub mod api;
pub mod descriptor;
pub mod functions;
pub mod keys;
pub(crate) mod types;

pub use error::{Error, ErrorKind, ErrorResponse, InnerErrorResponse};
pub use types::*;
