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

extern crate clap;
extern crate keyapi;
extern crate log;
extern crate serde;
extern crate serde_json;

use std::error::Error;

use log::info;

use clap::{App, Arg, SubCommand};
use serde::Serialize;

use keyapi::api::JsonMappingApi;
use keyapi::descriptor::{build_multisig_descriptor, MultisigRequest};
use keyapi::functions::list_supported_functions;
use keyapi::keys::{generate_key_pair, KeyPairRequest};
use keyapi::{Network, ScriptHashType};

/// Terms of the sample contract. Amounts are in satoshi, the fee is paid once per transaction
/// and is not included in the fund amount.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractConditions {
    fund_amt: u64,
    fee_amt: u64,
    pay_addr_alice: &'static str,
    pay_addr_bob: &'static str,
    chg_addr_alice: &'static str,
    chg_addr_bob: &'static str,
}

const CONTRACT_CONDS: ContractConditions = ContractConditions {
    fund_amt: 5_000_000_000,
    fee_amt: 8_000,
    pay_addr_alice: "tb1qmtjru45n7v8rklpan2vfzms7gex23d780lxkl2",
    pay_addr_bob: "tb1qj52arfpmwxyjwddvjhjy45nkl725h583es0mef",
    chg_addr_alice: "tb1q6vugzhd50r3yxgejxym0yzylkpkh2qqcvjuqp4",
    chg_addr_bob: "tb1qy7c7fqkgags3g6j0r8naj6c8fydcaz766d0skr",
};

const MULTISIG_KEYS: [&str; 2] = [
    "0205ffcdde75f262d66ada3dd877c7471f8f8ee9ee24d917c3e18d01cee458bafe",
    "02be61f4350b4ae7544f99649a917f48ba16cf48c983ac1599774958d88ad17ec5",
];

fn print_block<T: Serialize>(label: &str, value: &T) -> Result<(), serde_json::Error> {
    println!("*** {} ***\n{}\n", label, serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let matches = App::new("keyapi demo")
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"))
        .about("Calls the key and multisig API, printing every request and response")
        .arg(
            Arg::with_name("network")
                .short("n")
                .long("network")
                .help("Sets the network")
                .takes_value(true)
                .default_value("testnet")
                .possible_values(&["mainnet", "testnet", "regtest"]),
        )
        .subcommand(
            SubCommand::with_name("call")
                .about("Calls a single function of the JSON mapping API")
                .arg(
                    Arg::with_name("FUNCTION")
                        .help("Name of the function, e.g. CreateKeyPair")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("REQUEST")
                        .help("JSON request")
                        .default_value("{}")
                        .index(2),
                ),
        )
        .get_matches();

    if let Some(call) = matches.subcommand_matches("call") {
        let function = call.value_of("FUNCTION").unwrap_or_default();
        let request: serde_json::Value =
            serde_json::from_str(call.value_of("REQUEST").unwrap_or("{}"))?;

        println!("===== {} =====", function);
        print_block("Request", &request)?;
        let response = JsonMappingApi::new().call_function(function, &request.to_string())?;
        let response: serde_json::Value = serde_json::from_str(&response)?;
        print_block("Response", &response)?;

        return Ok(());
    }

    let network = matches
        .value_of("network")
        .unwrap_or("testnet")
        .parse::<Network>()?;
    info!("Running against {}", network);

    println!("===== Supported Function =====");
    print_block("Response", &list_supported_functions())?;

    println!("===== CreateKeyPair =====");
    let request = KeyPairRequest {
        wif: true,
        network,
        is_compressed: true,
    };
    print_block("Request", &request)?;
    print_block("Response", &generate_key_pair(&request)?)?;

    println!("===== CONTRACT_CONDS =====");
    print_block("Constant", &CONTRACT_CONDS)?;

    println!("===== CreateMultisig =====");
    let request = MultisigRequest {
        required_signatures: 2,
        public_keys: MULTISIG_KEYS.iter().map(|k| k.to_string()).collect(),
        network,
        script_hash_type: ScriptHashType::P2wsh,
        is_elements: false,
    };
    print_block("Request", &request)?;
    print_block("Response", &build_multisig_descriptor(&request)?)?;

    Ok(())
}
