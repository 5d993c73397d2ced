//! Operation descriptors for the Esgob API 1.0
//!
//! Every remote operation the client supports is listed here once, with its
//! wire name, the parameters it requires and the shape of its result. The
//! named methods on `EsgobClient` are thin projections over these.

use std::fmt;

use esgob_core::types::{Account, ActionResult, DomainEntry, SlaveDomains, SoaCheck};

/// How the JSON body of an operation is turned into a typed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Account fields, `added` as epoch seconds
    Account,
    /// `domains`: list of `{domain, type}`
    DomainList,
    /// `domains`: list of `{domain, masterip}`
    SlaveList,
    /// `{action, domain?}` for a single domain
    Action,
    /// `{domain?, responses: {masters, anycastnodes}}`
    SoaCheck,
}

/// Typed result of an operation, one variant per [`ResultShape`]
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Account(Account),
    DomainList(Vec<DomainEntry>),
    SlaveList(SlaveDomains),
    Action(ActionResult),
    SoaCheck(SoaCheck),
}

impl Response {
    /// Shape this result was decoded as
    pub fn shape(&self) -> ResultShape {
        match self {
            Response::Account(_) => ResultShape::Account,
            Response::DomainList(_) => ResultShape::DomainList,
            Response::SlaveList(_) => ResultShape::SlaveList,
            Response::Action(_) => ResultShape::Action,
            Response::SoaCheck(_) => ResultShape::SoaCheck,
        }
    }
}

/// A remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AccountsGet,
    DomainsList,
    DomainsSlavesList,
    DomainsSlavesAdd,
    DomainsSlavesDelete,
    DomainsSlavesForceTransfer,
    DomainsSlavesUpdateMasterIp,
    DomainsSlavesAxfrOutAdd,
    DomainsSlavesAxfrOutDelete,
    DomainsToolsSoaCheck,
}

impl Operation {
    /// Every supported operation
    pub const ALL: [Operation; 10] = [
        Operation::AccountsGet,
        Operation::DomainsList,
        Operation::DomainsSlavesList,
        Operation::DomainsSlavesAdd,
        Operation::DomainsSlavesDelete,
        Operation::DomainsSlavesForceTransfer,
        Operation::DomainsSlavesUpdateMasterIp,
        Operation::DomainsSlavesAxfrOutAdd,
        Operation::DomainsSlavesAxfrOutDelete,
        Operation::DomainsToolsSoaCheck,
    ];

    /// Wire name, appended to the endpoint
    pub fn name(self) -> &'static str {
        match self {
            Operation::AccountsGet => "accounts.get",
            Operation::DomainsList => "domains.list",
            Operation::DomainsSlavesList => "domains.slaves.list",
            Operation::DomainsSlavesAdd => "domains.slaves.add",
            Operation::DomainsSlavesDelete => "domains.slaves.delete",
            Operation::DomainsSlavesForceTransfer => "domains.slaves.forcetransfer",
            Operation::DomainsSlavesUpdateMasterIp => "domains.slaves.updatemasterip",
            Operation::DomainsSlavesAxfrOutAdd => "domains.slaves.axfrout.add",
            Operation::DomainsSlavesAxfrOutDelete => "domains.slaves.axfrout.delete",
            Operation::DomainsToolsSoaCheck => "domains.tools.soacheck",
        }
    }

    /// Parameters that must be supplied on top of the credentials
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Operation::AccountsGet | Operation::DomainsList | Operation::DomainsSlavesList => &[],
            Operation::DomainsSlavesDelete
            | Operation::DomainsSlavesForceTransfer
            | Operation::DomainsToolsSoaCheck => &["domain"],
            Operation::DomainsSlavesAdd | Operation::DomainsSlavesUpdateMasterIp => {
                &["domain", "masterip"]
            }
            Operation::DomainsSlavesAxfrOutAdd | Operation::DomainsSlavesAxfrOutDelete => {
                &["domain", "axfrip"]
            }
        }
    }

    /// Shape of the successful response
    pub fn result_shape(self) -> ResultShape {
        match self {
            Operation::AccountsGet => ResultShape::Account,
            Operation::DomainsList => ResultShape::DomainList,
            Operation::DomainsSlavesList => ResultShape::SlaveList,
            Operation::DomainsToolsSoaCheck => ResultShape::SoaCheck,
            Operation::DomainsSlavesAdd
            | Operation::DomainsSlavesDelete
            | Operation::DomainsSlavesForceTransfer
            | Operation::DomainsSlavesUpdateMasterIp
            | Operation::DomainsSlavesAxfrOutAdd
            | Operation::DomainsSlavesAxfrOutDelete => ResultShape::Action,
        }
    }

    /// Look an operation up by wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// First required parameter missing from `params`, if any
    pub fn missing_param(self, params: &[(&str, &str)]) -> Option<&'static str> {
        self.required_params().iter().copied().find(|required| {
            !params
                .iter()
                .any(|(name, value)| name == required && !value.is_empty())
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
