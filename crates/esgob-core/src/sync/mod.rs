//! Slave-zone sync engine
//!
//! The SyncEngine is responsible for:
//! - Fetching the current slave zones via `SlaveZoneApi`
//! - Diffing them against a desired domain list for one master IP
//! - Issuing add / update / delete calls in a deterministic order
//! - Collecting the result of every applied change
//!
//! ## Architecture
//!
//! ```text
//!  desired domains ──┐
//!  master IP ────────┤
//!                    ▼
//!            ┌──────────────┐  domains_slaves_list   ┌──────────────┐
//!            │  SyncEngine  │ ─────────────────────► │ SlaveZoneApi │
//!            └──────────────┘ ◄───── SlaveDomains ── └──────────────┘
//!                    │                                       ▲
//!                    ▼                                       │
//!            ┌──────────────┐   add / update / delete        │
//!            │   SyncPlan   │ ───────────────────────────────┘
//!            └──────────────┘
//! ```
//!
//! ## Ordering
//!
//! 1. Additions, in the order the desired domains were given
//! 2. Updates and deletions, in lexicographic order of the current domains
//!
//! A failed call aborts the remainder of the plan; the error is returned
//! to the caller unchanged.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, error, info};

use crate::error::Result;
use crate::traits::SlaveZoneApi;
use crate::types::{ActionResult, SlaveDomains};

/// Kind of change applied to a slave zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOperation {
    /// Zone is desired but absent remotely
    Add,
    /// Zone is desired but transfers from another master IP
    Update,
    /// Zone exists remotely but is not desired
    Delete,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncOperation::Add => "add",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One step of a sync plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    /// Affected domain
    pub domain: String,
    /// What to do with it
    pub operation: SyncOperation,
    /// Master IP for additions and updates
    pub masterip: Option<String>,
}

impl PlannedChange {
    fn add(domain: &str, masterip: &str) -> Self {
        Self {
            domain: domain.to_string(),
            operation: SyncOperation::Add,
            masterip: Some(masterip.to_string()),
        }
    }

    fn update(domain: &str, masterip: &str) -> Self {
        Self {
            domain: domain.to_string(),
            operation: SyncOperation::Update,
            masterip: Some(masterip.to_string()),
        }
    }

    fn delete(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            operation: SyncOperation::Delete,
            masterip: None,
        }
    }
}

impl fmt::Display for PlannedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.masterip {
            Some(masterip) => write!(f, "{} {} ({})", self.operation, self.domain, masterip),
            None => write!(f, "{} {}", self.operation, self.domain),
        }
    }
}

/// Ordered list of changes that makes the remote slave zones match a
/// desired domain list
///
/// Derived fresh on every sync; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    changes: Vec<PlannedChange>,
}

impl SyncPlan {
    /// Compute the plan for `desired` against `current`
    ///
    /// Duplicate and blank entries in `desired` are ignored. Domains already
    /// transferring from `masterip` produce no change.
    pub fn compute<S: AsRef<str>>(current: &SlaveDomains, desired: &[S], masterip: &str) -> Self {
        let mut wanted: HashSet<&str> = HashSet::with_capacity(desired.len());
        let mut changes = Vec::new();

        for domain in desired.iter().map(|d| d.as_ref().trim()) {
            if domain.is_empty() || !wanted.insert(domain) {
                continue;
            }
            if !current.contains_key(domain) {
                changes.push(PlannedChange::add(domain, masterip));
            }
        }

        // BTreeMap iteration is already in sorted key order
        for (domain, current_ip) in current {
            if !wanted.contains(domain.as_str()) {
                changes.push(PlannedChange::delete(domain));
            } else if current_ip != masterip {
                changes.push(PlannedChange::update(domain, masterip));
            }
        }

        Self { changes }
    }

    /// Planned changes, in execution order
    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }

    /// Whether the remote state already matches
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of planned changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of planned changes of one kind
    pub fn count(&self, operation: SyncOperation) -> usize {
        self.changes
            .iter()
            .filter(|change| change.operation == operation)
            .count()
    }
}

impl<'a> IntoIterator for &'a SyncPlan {
    type Item = &'a PlannedChange;
    type IntoIter = std::slice::Iter<'a, PlannedChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Reconciles slave zones through a [`SlaveZoneApi`]
///
/// The engine holds no state of its own; every call to [`SyncEngine::sync`]
/// fetches the remote listing again. Calls are issued strictly one after
/// another.
pub struct SyncEngine<'a> {
    api: &'a dyn SlaveZoneApi,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine operating through `api`
    pub fn new(api: &'a dyn SlaveZoneApi) -> Self {
        Self { api }
    }

    /// Fetch the remote slave zones and compute the plan without applying it
    pub async fn plan<S: AsRef<str>>(&self, desired: &[S], masterip: &str) -> Result<SyncPlan> {
        let current = self.api.domains_slaves_list().await?;
        debug!("Remote has {} slave zone(s)", current.len());

        let plan = SyncPlan::compute(&current, desired, masterip);
        info!(
            "Sync plan for master {}: {} add, {} update, {} delete",
            masterip,
            plan.count(SyncOperation::Add),
            plan.count(SyncOperation::Update),
            plan.count(SyncOperation::Delete)
        );
        Ok(plan)
    }

    /// Apply a plan, returning one result per change
    pub async fn apply(&self, plan: &SyncPlan) -> Result<Vec<ActionResult>> {
        self.apply_with(plan, |_| {}).await
    }

    /// Apply a plan, calling `on_applied` after each successful change
    ///
    /// Results that do not name a domain are given the planned one. The
    /// callback lets a caller report progress before a later failure aborts
    /// the run.
    pub async fn apply_with<F>(&self, plan: &SyncPlan, mut on_applied: F) -> Result<Vec<ActionResult>>
    where
        F: FnMut(&ActionResult),
    {
        let mut results = Vec::with_capacity(plan.len());

        for change in plan {
            debug!("Applying: {}", change);
            let masterip = change.masterip.as_deref().unwrap_or_default();

            let outcome = match change.operation {
                SyncOperation::Add => self.api.domains_slaves_add(&change.domain, masterip).await,
                SyncOperation::Update => {
                    self.api
                        .domains_slaves_updatemasterip(&change.domain, masterip)
                        .await
                }
                SyncOperation::Delete => self.api.domains_slaves_delete(&change.domain).await,
            };

            match outcome {
                Ok(result) => {
                    let result = result.with_default_domain(&change.domain);
                    on_applied(&result);
                    results.push(result);
                }
                Err(e) => {
                    error!(
                        "Sync aborted at {} after {} of {} change(s): {}",
                        change,
                        results.len(),
                        plan.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        info!("Sync applied {} change(s)", results.len());
        Ok(results)
    }

    /// Make the remote slave zones for `masterip` match `desired`
    pub async fn sync<S: AsRef<str>>(
        &self,
        desired: &[S],
        masterip: &str,
    ) -> Result<Vec<ActionResult>> {
        let plan = self.plan(desired, masterip).await?;
        self.apply(&plan).await
    }
}
