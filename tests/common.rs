#![allow(unused)]
use keyapi::api::JsonMappingApi;
use serde_json::Value;

pub const KEY_A: &str = "0205ffcdde75f262d66ada3dd877c7471f8f8ee9ee24d917c3e18d01cee458bafe";
pub const KEY_B: &str = "02be61f4350b4ae7544f99649a917f48ba16cf48c983ac1599774958d88ad17ec5";

/// Call `function` through the JSON mapping API and parse the response.
pub fn call_json(function: &str, request: Value) -> Value {
    let api = JsonMappingApi::new();
    let response = api.call(function, &request.to_string());
    serde_json::from_str(&response).unwrap()
}

/// Return the error object of a response, panicking if the call succeeded.
pub fn expect_error(response: &Value) -> &Value {
    response
        .get("error")
        .unwrap_or_else(|| panic!("expected an error response, got {}", response))
}
