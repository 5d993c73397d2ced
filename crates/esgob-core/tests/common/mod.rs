//! Test doubles and common utilities for sync contract tests

#![allow(dead_code)]

use esgob_core::error::{Error, Result};
use esgob_core::traits::SlaveZoneApi;
use esgob_core::types::{ActionResult, SlaveDomains};
use std::sync::Mutex;

/// A remote call observed by [`RecordingSlaveApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Add(String, String),
    Update(String, String),
    Delete(String),
}

/// A SlaveZoneApi that serves a fixed listing and records every call
pub struct RecordingSlaveApi {
    current: SlaveDomains,
    calls: Mutex<Vec<Call>>,
    /// Domain whose mutation fails with a server error
    fail_on: Option<String>,
    /// Answer mutations with `{action}` only, like the live API often does
    omit_domain: bool,
}

impl RecordingSlaveApi {
    pub fn new(current: &[(&str, &str)]) -> Self {
        Self {
            current: current
                .iter()
                .map(|(d, ip)| (d.to_string(), ip.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            omit_domain: false,
        }
    }

    /// Make any mutation of `domain` fail
    pub fn failing_on(mut self, domain: &str) -> Self {
        self.fail_on = Some(domain.to_string());
        self
    }

    /// Return results with an empty domain
    pub fn omitting_domain(mut self) -> Self {
        self.omit_domain = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the initial listing
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| *call != Call::List)
            .collect()
    }

    fn record(&self, call: Call, domain: &str, action: &str) -> Result<ActionResult> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on.as_deref() == Some(domain) {
            return Err(Error::server(
                "Domain is not present in your account",
                Some("2007".to_string()),
            ));
        }
        let named = if self.omit_domain { "" } else { domain };
        Ok(ActionResult::new(named, Some(action.to_string())))
    }
}

#[async_trait::async_trait]
impl SlaveZoneApi for RecordingSlaveApi {
    async fn domains_slaves_list(&self) -> Result<SlaveDomains> {
        self.calls.lock().unwrap().push(Call::List);
        Ok(self.current.clone())
    }

    async fn domains_slaves_add(&self, domain: &str, masterip: &str) -> Result<ActionResult> {
        self.record(
            Call::Add(domain.to_string(), masterip.to_string()),
            domain,
            "domain added",
        )
    }

    async fn domains_slaves_updatemasterip(
        &self,
        domain: &str,
        masterip: &str,
    ) -> Result<ActionResult> {
        self.record(
            Call::Update(domain.to_string(), masterip.to_string()),
            domain,
            "domain master IP updated",
        )
    }

    async fn domains_slaves_delete(&self, domain: &str) -> Result<ActionResult> {
        self.record(Call::Delete(domain.to_string()), domain, "domain deleted")
    }
}

/// Call::Add shorthand
pub fn add(domain: &str, ip: &str) -> Call {
    Call::Add(domain.to_string(), ip.to_string())
}

/// Call::Update shorthand
pub fn update(domain: &str, ip: &str) -> Call {
    Call::Update(domain.to_string(), ip.to_string())
}

/// Call::Delete shorthand
pub fn delete(domain: &str) -> Call {
    Call::Delete(domain.to_string())
}
