#![allow(dead_code)]

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use twitter2_auth::{ApplicationCredential, Config};
use wiremock::{MockServer, Request};

pub const CONSUMER_KEY: &str = "consumer-key";
pub const CONSUMER_SECRET: &str = "consumer-secret";

pub fn app() -> ApplicationCredential {
    ApplicationCredential::new(CONSUMER_KEY, CONSUMER_SECRET)
}

pub fn config(server: &MockServer) -> Config {
    Config::new().api_base(server.uri()).allow_http()
}

/// Splits an `OAuth k="v", ...` header into its decoded parameters.
pub fn oauth_params(header: &str) -> HashMap<String, String> {
    header
        .strip_prefix("OAuth ")
        .expect("not an OAuth header")
        .split(", ")
        .map(|param| {
            let (key, val) = param.split_once('=').expect("malformed OAuth parameter");
            let val = val.trim_matches('"');
            (
                key.to_owned(),
                percent_decode_str(val).decode_utf8().unwrap().into_owned(),
            )
        })
        .collect()
}

pub fn request_oauth_params(request: &Request) -> HashMap<String, String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(oauth_params)
        .unwrap_or_default()
}

/// Matches requests whose OAuth `oauth_token` parameter is exactly `expected`, where `None` means
/// that the parameter must be absent.
pub fn oauth_token_is(expected: Option<&'static str>) -> impl Fn(&Request) -> bool {
    move |request: &Request| {
        let params = request_oauth_params(request);
        params.contains_key("oauth_signature")
            && params.get("oauth_token").map(String::as_str) == expected
    }
}

pub fn form_response(body: &str) -> wiremock::ResponseTemplate {
    wiremock::ResponseTemplate::new(200).set_body_string(body)
}
