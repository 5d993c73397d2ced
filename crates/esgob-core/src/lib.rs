// # esgob-core
//
// Core library for the Esgob DNS hosting client.
//
// ## Architecture Overview
//
// - **Config / Credentials**: explicit configuration resolved from arguments,
//   environment variables and a flat `name value` config file
// - **SlaveZoneApi**: trait over the remote slave-zone operations
// - **SyncEngine**: reconciles a desired domain list against the remote
//   slave zones, issuing add / update / delete calls in a fixed order
// - **Types**: normalized results of the remote operations
//
// The HTTP implementation of `SlaveZoneApi` lives in `esgob-client`; this
// crate performs no network I/O of its own.

pub mod config;
pub mod error;
pub mod sync;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use config::{Config, ConfigLoader, Credentials};
pub use error::{Error, Result};
pub use sync::{PlannedChange, SyncEngine, SyncOperation, SyncPlan};
pub use traits::SlaveZoneApi;
pub use types::{
    Account, ActionResult, DomainEntry, DomainType, Fields, SlaveDomains, SoaCheck,
};
