//! Core traits for the Esgob client
//!
//! - [`SlaveZoneApi`]: the remote slave-zone operations the sync engine needs

pub mod slave_api;

pub use slave_api::SlaveZoneApi;
