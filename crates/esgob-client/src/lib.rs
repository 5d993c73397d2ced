// # Esgob API Client
//
// This crate provides the HTTP client for the Esgob DNS hosting API 1.0.
//
// - One authenticated GET per operation, `Accept: application/json`
// - Query string: `account`, `key`, `f=json` plus operation parameters,
//   percent-encoded and sorted by key
// - Response keys normalized before any typed result is built
// - Typed server errors from the API's `error` object or the HTTP status
// - NO retry, backoff or caching; errors propagate to the caller
//
// ## Security
//
// - API key NEVER appears in logs or Debug output
// - Transport errors are stripped of the request URL, which carries the key
//
// ## API Reference
//
// - Base URL: `https://api.esgob.com/1.0/`
// - Operations: see [`Operation`]

pub mod client;
pub mod normalize;
pub mod operation;
pub mod query;

pub use client::{EsgobClient, NOT_JSON_MESSAGE, decode, interpret_response};
pub use normalize::normalize_keys;
pub use operation::{Operation, Response, ResultShape};
pub use query::build_query;
