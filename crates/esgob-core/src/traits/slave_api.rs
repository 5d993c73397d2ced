// # Slave Zone API Trait
//
// Defines the remote operations the sync engine reconciles through.
//
// ## Implementations
//
// - HTTP: `esgob-client` crate (`EsgobClient`)
// - Tests: recording doubles in `tests/common`

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ActionResult, SlaveDomains};

/// Remote slave-zone operations
///
/// Each method is a single request/response round trip. Implementations
/// must not retry: errors are returned to the caller as-is.
///
/// Every returned [`ActionResult`] carries the domain it was requested for
/// unless the API names a different one.
#[async_trait]
pub trait SlaveZoneApi: Send + Sync {
    /// Current slave zones, keyed by domain
    async fn domains_slaves_list(&self) -> Result<SlaveDomains>;

    /// Add a slave zone transferring from `masterip`
    async fn domains_slaves_add(&self, domain: &str, masterip: &str) -> Result<ActionResult>;

    /// Change the master IP of an existing slave zone
    async fn domains_slaves_updatemasterip(
        &self,
        domain: &str,
        masterip: &str,
    ) -> Result<ActionResult>;

    /// Remove a slave zone
    async fn domains_slaves_delete(&self, domain: &str) -> Result<ActionResult>;
}
