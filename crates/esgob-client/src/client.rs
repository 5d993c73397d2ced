//! Esgob API client
//!
//! One authenticated GET per operation; no retries, no caching, no
//! background tasks. The credentials are fixed at construction.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use esgob_core::config::DEFAULT_TIMEOUT_SECS;
use esgob_core::traits::SlaveZoneApi;
use esgob_core::types::{
    Account, ActionResult, DomainEntry, Fields, SlaveDomains, SoaCheck,
};
use esgob_core::{Config, ConfigLoader, Credentials, Error, Result};

use crate::normalize::normalize_keys;
use crate::operation::{Operation, Response, ResultShape};
use crate::query::build_query;

/// Message of the transport error raised for non-JSON responses
pub const NOT_JSON_MESSAGE: &str = "HTTP response from Esgob is not of type JSON";

/// Client for the Esgob DNS hosting API
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct EsgobClient {
    credentials: Credentials,

    /// HTTP client for API requests
    http: reqwest::Client,
}

impl fmt::Debug for EsgobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EsgobClient")
            .field("account", &self.credentials.account())
            .field("endpoint", &self.credentials.endpoint())
            .finish()
    }
}

impl EsgobClient {
    /// Create a client with the default timeout
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_timeout(credentials, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("esgob-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { credentials, http })
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(config.credentials()?, config.timeout())
    }

    /// Create a client from the environment and the default config files
    pub fn from_default_sources() -> Result<Self> {
        Self::from_config(&ConfigLoader::new().load()?)
    }

    /// Credentials used for every request
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Full request URL for a call, credentials included
    pub fn request_url(&self, operation: &str, extra: &[(&str, &str)]) -> String {
        format!(
            "{}{}?{}",
            self.credentials.endpoint(),
            operation,
            build_query(&self.credentials, extra)
        )
    }

    /// Call an operation by wire name and return its normalized JSON body
    ///
    /// `extra` parameters override the authentication defaults of the same
    /// name for this call only.
    pub async fn call(&self, operation: &str, extra: &[(&str, &str)]) -> Result<Value> {
        let url = self.request_url(operation, extra);
        debug!(
            "GET {}{} ({} extra parameter(s))",
            self.credentials.endpoint(),
            operation,
            extra.len()
        );

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                Error::transport(format!(
                    "HTTP request to Esgob failed: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);

        let body = response.text().await.map_err(|e| {
            Error::transport(format!("Failed to read Esgob response: {}", e.without_url()))
        })?;

        interpret_response(status, is_json, &body).inspect_err(|e| {
            if e.is_server() {
                warn!("{} rejected by Esgob: {}", operation, e);
            }
        })
    }

    /// Call a described operation, checking its required parameters first
    pub async fn call_operation(
        &self,
        operation: Operation,
        params: &[(&str, &str)],
    ) -> Result<Value> {
        if let Some(missing) = operation.missing_param(params) {
            return Err(Error::invalid_input(format!(
                "{operation} requires parameter '{missing}'"
            )));
        }
        self.call(operation.name(), params).await
    }

    /// Call a described operation and decode the body by its [`ResultShape`]
    pub async fn execute(&self, operation: Operation, params: &[(&str, &str)]) -> Result<Response> {
        let value = self.call_operation(operation, params).await?;
        let domain = params
            .iter()
            .find(|(name, _)| *name == "domain")
            .map(|(_, value)| *value)
            .unwrap_or_default();
        decode(operation, value, domain)
    }

    /// Account information
    pub async fn accounts_get(&self) -> Result<Account> {
        let op = Operation::AccountsGet;
        match self.execute(op, &[]).await? {
            Response::Account(account) => Ok(account),
            _ => Err(shape_mismatch(op)),
        }
    }

    /// All domains on the account
    pub async fn domains_list(&self) -> Result<Vec<DomainEntry>> {
        let op = Operation::DomainsList;
        match self.execute(op, &[]).await? {
            Response::DomainList(domains) => Ok(domains),
            _ => Err(shape_mismatch(op)),
        }
    }

    /// Slave zones, keyed by domain
    pub async fn domains_slaves_list(&self) -> Result<SlaveDomains> {
        let op = Operation::DomainsSlavesList;
        match self.execute(op, &[]).await? {
            Response::SlaveList(slaves) => Ok(slaves),
            _ => Err(shape_mismatch(op)),
        }
    }

    /// Add a slave zone transferring from `masterip`
    pub async fn domains_slaves_add(&self, domain: &str, masterip: &str) -> Result<ActionResult> {
        self.action(
            Operation::DomainsSlavesAdd,
            &[("domain", domain), ("masterip", masterip)],
        )
        .await
    }

    /// Delete a slave zone
    pub async fn domains_slaves_delete(&self, domain: &str) -> Result<ActionResult> {
        self.action(Operation::DomainsSlavesDelete, &[("domain", domain)])
            .await
    }

    /// Request an immediate AXFR from the master
    pub async fn domains_slaves_forcetransfer(&self, domain: &str) -> Result<ActionResult> {
        self.action(Operation::DomainsSlavesForceTransfer, &[("domain", domain)])
            .await
    }

    /// Change the master IP of a slave zone
    pub async fn domains_slaves_updatemasterip(
        &self,
        domain: &str,
        masterip: &str,
    ) -> Result<ActionResult> {
        self.action(
            Operation::DomainsSlavesUpdateMasterIp,
            &[("domain", domain), ("masterip", masterip)],
        )
        .await
    }

    /// Allow `axfrip` to transfer the zone out
    pub async fn domains_slaves_axfrout_add(
        &self,
        domain: &str,
        axfrip: &str,
    ) -> Result<ActionResult> {
        self.action(
            Operation::DomainsSlavesAxfrOutAdd,
            &[("domain", domain), ("axfrip", axfrip)],
        )
        .await
    }

    /// Revoke AXFR-out for `axfrip`
    pub async fn domains_slaves_axfrout_delete(
        &self,
        domain: &str,
        axfrip: &str,
    ) -> Result<ActionResult> {
        self.action(
            Operation::DomainsSlavesAxfrOutDelete,
            &[("domain", domain), ("axfrip", axfrip)],
        )
        .await
    }

    /// SOA serial of `domain` on the masters and every anycast node
    pub async fn domains_tools_soacheck(&self, domain: &str) -> Result<SoaCheck> {
        let op = Operation::DomainsToolsSoaCheck;
        match self.execute(op, &[("domain", domain)]).await? {
            Response::SoaCheck(check) => Ok(check),
            _ => Err(shape_mismatch(op)),
        }
    }

    async fn action(&self, operation: Operation, params: &[(&str, &str)]) -> Result<ActionResult> {
        match self.execute(operation, params).await? {
            Response::Action(result) => Ok(result),
            _ => Err(shape_mismatch(operation)),
        }
    }
}

#[async_trait]
impl SlaveZoneApi for EsgobClient {
    async fn domains_slaves_list(&self) -> Result<SlaveDomains> {
        EsgobClient::domains_slaves_list(self).await
    }

    async fn domains_slaves_add(&self, domain: &str, masterip: &str) -> Result<ActionResult> {
        EsgobClient::domains_slaves_add(self, domain, masterip).await
    }

    async fn domains_slaves_updatemasterip(
        &self,
        domain: &str,
        masterip: &str,
    ) -> Result<ActionResult> {
        EsgobClient::domains_slaves_updatemasterip(self, domain, masterip).await
    }

    async fn domains_slaves_delete(&self, domain: &str) -> Result<ActionResult> {
        EsgobClient::domains_slaves_delete(self, domain).await
    }
}

/// Classify a response and return its normalized body
///
/// Precedence: a JSON `error` object, then a non-2xx status, then a
/// non-JSON content type.
pub fn interpret_response(status: StatusCode, is_json: bool, body: &str) -> Result<Value> {
    let parsed = if is_json {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Some(normalize_keys(value)),
            Err(e) if status.is_success() => return Err(Error::Json(e)),
            Err(_) => None,
        }
    } else {
        None
    };

    if let Some(error) = parsed
        .as_ref()
        .and_then(|value| value.get("error"))
        .filter(|error| error.is_object())
    {
        let message = error
            .get("message")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| "Unknown error".to_string());
        let code = error.get("code").and_then(scalar_to_string);
        return Err(Error::server(message, code));
    }

    if !status.is_success() {
        return Err(Error::server(
            status.canonical_reason().unwrap_or("Unknown Status"),
            Some(status.as_u16().to_string()),
        ));
    }

    parsed.ok_or_else(|| Error::transport(NOT_JSON_MESSAGE))
}

/// Turn a normalized body into the typed result its operation declares
///
/// `domain` is the requested domain; action results and SOA checks fall
/// back to it when the body does not name one.
pub fn decode(operation: Operation, value: Value, domain: &str) -> Result<Response> {
    Ok(match operation.result_shape() {
        ResultShape::Account => Response::Account(Account::from_fields(into_fields(value, operation)?)?),
        ResultShape::DomainList => {
            let domains = take_domains(value, operation)?;
            Response::DomainList(
                serde_json::from_value(domains)
                    .map_err(|e| Error::invalid_response(format!("{operation}: {e}")))?,
            )
        }
        ResultShape::SlaveList => Response::SlaveList(slave_domains(take_domains(value, operation)?)?),
        ResultShape::Action => {
            Response::Action(ActionResult::from_fields(into_fields(value, operation)?, domain))
        }
        ResultShape::SoaCheck => {
            Response::SoaCheck(SoaCheck::from_fields(into_fields(value, operation)?, domain)?)
        }
    })
}

fn shape_mismatch(operation: Operation) -> Error {
    Error::invalid_response(format!(
        "{operation}: decoded result does not match {:?}",
        operation.result_shape()
    ))
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime == "text/json" || mime.ends_with("+json")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn into_fields(value: Value, operation: Operation) -> Result<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::invalid_response(format!(
            "{operation}: expected a JSON object, got {other}"
        ))),
    }
}

fn take_domains(value: Value, operation: Operation) -> Result<Value> {
    into_fields(value, operation)?
        .remove("domains")
        .ok_or_else(|| Error::invalid_response(format!("{operation}: missing 'domains'")))
}

/// Accepts either a list of `{domain, masterip}` or a `{domain: masterip}` map
fn slave_domains(domains: Value) -> Result<SlaveDomains> {
    let op = Operation::DomainsSlavesList;
    match domains {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| {
                let domain = entry.get("domain").and_then(Value::as_str);
                let masterip = entry.get("masterip").and_then(Value::as_str);
                match (domain, masterip) {
                    (Some(domain), Some(masterip)) => {
                        Ok((domain.to_string(), masterip.to_string()))
                    }
                    _ => Err(Error::invalid_response(format!(
                        "{op}: entry without domain/masterip: {entry}"
                    ))),
                }
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(domain, masterip)| match masterip {
                Value::String(ip) => Ok((domain, ip)),
                other => Err(Error::invalid_response(format!(
                    "{op}: master IP of {domain} is not a string: {other}"
                ))),
            })
            .collect(),
        Value::Null => Ok(SlaveDomains::new()),
        other => Err(Error::invalid_response(format!(
            "{op}: unexpected 'domains' value: {other}"
        ))),
    }
}
