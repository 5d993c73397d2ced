//! Query string construction
//!
//! Every request carries the authentication triple `account`, `key` and
//! `f=json`. Caller parameters override these on collision. Pairs are
//! percent-encoded and emitted in ascending key order, so the same call
//! always produces the same URL.

use std::collections::BTreeMap;

use esgob_core::Credentials;

/// Response format requested from the API
const FORMAT_JSON: &str = "json";

/// Build the query string for a call
pub fn build_query(credentials: &Credentials, extra: &[(&str, &str)]) -> String {
    let mut params: BTreeMap<&str, &str> = BTreeMap::new();
    params.insert("account", credentials.account());
    params.insert("f", FORMAT_JSON);
    params.insert("key", credentials.key());

    for &(name, value) in extra {
        params.insert(name, value);
    }

    encode_pairs(&params)
}

/// Percent-encode sorted pairs as `k=v&k=v`
pub fn encode_pairs(params: &BTreeMap<&str, &str>) -> String {
    params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
