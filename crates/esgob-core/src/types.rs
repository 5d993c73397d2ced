//! Normalized results of the Esgob API operations
//!
//! Field names are normalized (lowercased) by the client before any of these
//! types are built from a response.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A normalized JSON object: field name to value
pub type Fields = serde_json::Map<String, Value>;

/// Slave zones keyed by domain, valued by master IP
///
/// Keys are unique and iterate in lexicographic order.
pub type SlaveDomains = BTreeMap<String, String>;

/// Result of a mutating operation on a single domain
///
/// `domain` is never empty: when the API omits it, it is the domain the
/// operation was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    /// The affected domain
    pub domain: String,
    /// Human-readable description of what the API did
    pub action: Option<String>,
    /// All normalized response fields, `domain` included
    pub fields: Fields,
}

impl ActionResult {
    /// Create a result without extra fields
    pub fn new(domain: impl Into<String>, action: Option<String>) -> Self {
        let domain = domain.into();
        let mut fields = Fields::new();
        fields.insert("domain".to_string(), Value::String(domain.clone()));
        if let Some(ref action) = action {
            fields.insert("action".to_string(), Value::String(action.clone()));
        }
        Self {
            domain,
            action,
            fields,
        }
    }

    /// Fill in `domain` when the result does not name one
    pub fn with_default_domain(mut self, domain: &str) -> Self {
        if self.domain.is_empty() {
            self.domain = domain.to_string();
            self.fields
                .insert("domain".to_string(), Value::String(self.domain.clone()));
        }
        self
    }

    /// Build from response fields, defaulting `domain` to `requested_domain`
    pub fn from_fields(mut fields: Fields, requested_domain: &str) -> Self {
        let domain = fields
            .get("domain")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .unwrap_or(requested_domain)
            .to_string();
        fields.insert("domain".to_string(), Value::String(domain.clone()));

        let action = fields
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            domain,
            action,
            fields,
        }
    }
}

/// Account information
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// When the account was created
    pub added: Option<DateTime<Utc>>,
    /// Remaining normalized fields (`id`, `name`, `credits`, `users`, ...)
    pub fields: Fields,
}

impl Account {
    /// Build from response fields, converting `added` from Unix epoch seconds
    pub fn from_fields(mut fields: Fields) -> Result<Self> {
        let added = match fields.remove("added") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => {
                let secs = n.as_i64().ok_or_else(|| {
                    Error::invalid_response(format!("account 'added' is not an epoch: {n}"))
                })?;
                Some(epoch_to_datetime(secs)?)
            }
            Some(Value::String(s)) => {
                let secs = s.trim().parse::<i64>().map_err(|_| {
                    Error::invalid_response(format!("account 'added' is not an epoch: {s}"))
                })?;
                Some(epoch_to_datetime(secs)?)
            }
            Some(other) => {
                return Err(Error::invalid_response(format!(
                    "account 'added' is not an epoch: {other}"
                )));
            }
        };

        Ok(Self { added, fields })
    }

    /// Look up a field by normalized name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Display-ready `(name, value)` pairs, `added` included
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), display_value(value)))
            .collect();
        if let Some(added) = self.added {
            entries.push(("added".to_string(), added.to_rfc3339()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

fn epoch_to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::invalid_response(format!("epoch out of range: {secs}")))
}

/// Kind of zone hosted by Esgob
///
/// The set is open: unknown types keep the name the API sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DomainType {
    /// Primary zone hosted by Esgob
    Master,
    /// Zone transferred from a customer master
    Slave,
    /// Any type this client does not know about
    Other(String),
}

impl DomainType {
    pub fn as_str(&self) -> &str {
        match self {
            DomainType::Master => "master",
            DomainType::Slave => "slave",
            DomainType::Other(name) => name,
        }
    }
}

impl From<String> for DomainType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "master" => DomainType::Master,
            "slave" => DomainType::Slave,
            _ => DomainType::Other(name),
        }
    }
}

impl From<DomainType> for String {
    fn from(domain_type: DomainType) -> Self {
        match domain_type {
            DomainType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the domain listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    /// Zone name
    pub domain: String,
    /// Zone type
    #[serde(rename = "type")]
    pub domain_type: DomainType,
}

/// SOA serials reported by every node serving a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoaCheck {
    /// The checked domain
    pub domain: String,
    /// Per-node answers
    pub responses: SoaResponses,
}

impl SoaCheck {
    /// Build from response fields, defaulting `domain` to `requested_domain`
    pub fn from_fields(fields: Fields, requested_domain: &str) -> Result<Self> {
        let action = ActionResult::from_fields(fields, requested_domain);
        serde_json::from_value(Value::Object(action.fields))
            .map_err(|e| Error::invalid_response(format!("soacheck: {e}")))
    }
}

/// Answers from master and anycast nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoaResponses {
    /// Customer master servers
    #[serde(default)]
    pub masters: Vec<MasterNode>,
    /// Esgob anycast nodes
    #[serde(default)]
    pub anycastnodes: Vec<AnycastNode>,
}

/// SOA answer from a master server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterNode {
    /// Master IP address
    pub ip: String,
    /// SOA serial, if any
    #[serde(default)]
    pub soa: Value,
    /// Query outcome
    #[serde(default)]
    pub response: Value,
}

/// SOA answer from an anycast node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnycastNode {
    /// Node identifier
    #[serde(rename = "ref")]
    pub reference: String,
    /// Node location
    #[serde(default)]
    pub country: String,
    /// SOA serial, if any
    #[serde(default)]
    pub soa: Value,
    /// Query outcome
    #[serde(default)]
    pub response: Value,
}

/// Render a JSON value for terminal output: strings unquoted, null empty
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_action_result_defaults_domain() {
        let result = ActionResult::from_fields(fields(json!({"action": "domain added"})), "example.org");
        assert_eq!(result.domain, "example.org");
        assert_eq!(result.action.as_deref(), Some("domain added"));
        assert_eq!(result.fields.get("domain"), Some(&json!("example.org")));
    }

    #[test]
    fn test_action_result_keeps_server_domain() {
        let result = ActionResult::from_fields(
            fields(json!({"action": "domain deleted", "domain": "other.org"})),
            "example.org",
        );
        assert_eq!(result.domain, "other.org");
    }

    #[test]
    fn test_action_result_replaces_empty_domain() {
        let result = ActionResult::from_fields(fields(json!({"domain": ""})), "example.org");
        assert_eq!(result.domain, "example.org");
        assert_eq!(result.action, None);
    }

    #[test]
    fn test_account_converts_added_epoch() {
        let account = Account::from_fields(fields(json!({
            "added": 1422792434,
            "credits": 48,
            "id": "xyz",
            "name": "Person Name",
            "users": []
        })))
        .unwrap();

        let expected = DateTime::parse_from_rfc3339("2015-02-01T12:07:14+00:00").unwrap();
        assert_eq!(account.added, Some(expected.with_timezone(&Utc)));
        assert_eq!(account.get("credits"), Some(&json!(48)));
        assert!(account.get("added").is_none());

        let entries = account.entries();
        assert_eq!(entries[0], ("added".to_string(), "2015-02-01T12:07:14+00:00".to_string()));
        assert!(entries.contains(&("name".to_string(), "Person Name".to_string())));
    }

    #[test]
    fn test_account_rejects_non_epoch_added() {
        let err = Account::from_fields(fields(json!({"added": [1]}))).unwrap_err();
        assert!(err.to_string().contains("not an epoch"));
    }

    #[test]
    fn test_domain_entry_types() {
        let entries: Vec<DomainEntry> = serde_json::from_value(json!([
            {"domain": "example.com", "type": "slave"},
            {"domain": "example.net", "type": "master"},
            {"domain": "example.uk", "type": "forward"}
        ]))
        .unwrap();
        assert_eq!(entries[0].domain_type, DomainType::Slave);
        assert_eq!(entries[1].domain_type, DomainType::Master);
        assert_eq!(entries[2].domain_type, DomainType::Other("forward".to_string()));
        assert_eq!(entries[0].domain_type.to_string(), "slave");
        assert_eq!(entries[2].domain_type.to_string(), "forward");
        assert_eq!(
            serde_json::to_value(&entries[2]).unwrap(),
            json!({"domain": "example.uk", "type": "forward"})
        );
    }

    #[test]
    fn test_action_result_default_domain_only_fills_empty() {
        let filled = ActionResult::new("", Some("domain added".to_string())).with_default_domain("b.com");
        assert_eq!(filled.domain, "b.com");
        assert_eq!(filled.fields.get("domain"), Some(&json!("b.com")));

        let kept = ActionResult::new("a.com", None).with_default_domain("b.com");
        assert_eq!(kept.domain, "a.com");
    }

    #[test]
    fn test_soacheck_defaults_domain() {
        let check = SoaCheck::from_fields(
            fields(json!({
                "responses": {
                    "masters": [{"ip": "195.177.253.166", "soa": 1422792434, "response": "OK"}],
                    "anycastnodes": [{"ref": "lon1", "country": "GB", "soa": null, "response": "timeout"}]
                }
            })),
            "example.org",
        )
        .unwrap();
        assert_eq!(check.domain, "example.org");
        assert_eq!(check.responses.masters[0].ip, "195.177.253.166");
        assert_eq!(check.responses.anycastnodes[0].reference, "lon1");
        assert_eq!(display_value(&check.responses.anycastnodes[0].soa), "");
        assert_eq!(display_value(&check.responses.masters[0].soa), "1422792434");
    }
}
