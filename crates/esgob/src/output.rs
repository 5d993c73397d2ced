//! Plain-text rendering of API results

use esgob_core::types::{Account, ActionResult, DomainEntry, SlaveDomains, SoaCheck, display_value};

/// Fixed-header text table with left-aligned, space-padded columns
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty, extra cells are dropped
    pub fn push<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row[col].chars().count())
                    .chain(std::iter::once(self.headers[col].chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        // Underline each header, not the whole column
        let rule: Vec<String> = self
            .headers
            .iter()
            .map(|header| "-".repeat(header.chars().count()))
            .collect();

        let mut out = String::new();
        for line in std::iter::once(&self.headers)
            .chain(std::iter::once(&rule))
            .chain(self.rows.iter())
        {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

pub fn account(account: &Account) -> String {
    account
        .entries()
        .into_iter()
        .map(|(name, value)| format!("{name:>8}: {value}\n"))
        .collect()
}

pub fn domains(domains: &[DomainEntry]) -> Table {
    let mut table = Table::new(["Domain", "Type"]);
    for entry in domains {
        table.push([entry.domain.clone(), entry.domain_type.to_string()]);
    }
    table
}

pub fn slaves(slaves: &SlaveDomains) -> Table {
    let mut table = Table::new(["Domain", "Master IP"]);
    for (domain, masterip) in slaves {
        table.push([domain.as_str(), masterip.as_str()]);
    }
    table
}

pub fn soacheck(check: &SoaCheck) -> Table {
    let mut table = Table::new(["Identifier", "Type", "Country", "SOA", "Response"]);
    for master in &check.responses.masters {
        table.push([
            master.ip.clone(),
            "master".to_string(),
            String::new(),
            display_value(&master.soa),
            display_value(&master.response),
        ]);
    }
    for node in &check.responses.anycastnodes {
        table.push([
            node.reference.clone(),
            "anycast".to_string(),
            node.country.clone(),
            display_value(&node.soa),
            display_value(&node.response),
        ]);
    }
    table
}

/// `domain => action`
pub fn action(result: &ActionResult) -> String {
    format!(
        "{} => {}",
        result.domain,
        result.action.as_deref().unwrap_or("done")
    )
}
