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

//! Build capabilities

use std::collections::BTreeMap;

/// Map of capability name to whether this build supports it
pub type SupportedFunctionsResponse = BTreeMap<String, bool>;

/// Capability flag for the base chain
pub const BITCOIN: &str = "bitcoin";
/// Capability flag for the Elements sidechain
pub const ELEMENTS: &str = "elements";

/// List the optional features supported by this build
pub fn list_supported_functions() -> SupportedFunctionsResponse {
    let mut functions = BTreeMap::new();
    functions.insert(BITCOIN.to_string(), true);
    functions.insert(ELEMENTS.to_string(), false);

    functions
}
