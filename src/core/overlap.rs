//! Overlap between offered algorithms and the allow-list

use std::collections::BTreeSet;

use serde::Serialize;

use super::algorithms::{AlgorithmCategory, ProposalField};
use super::proposal::NegotiationReport;

/// Width of the `=` rule around the report heading
const RULE_WIDTH: usize = 10;

/// Overlap for a single proposal field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapEntry {
    /// Field label as printed by the client (e.g. "ciphers ctos")
    pub field: &'static str,

    pub category: AlgorithmCategory,

    /// Everything the server offered for this field
    pub offered: BTreeSet<String>,

    /// Offered algorithms that are on the allow-list
    pub accepted: BTreeSet<String>,
}

impl OverlapEntry {
    pub fn compute(field: ProposalField, offered: &BTreeSet<String>) -> Self {
        let category = field.category();
        let accepted = offered
            .iter()
            .filter(|algo| category.accepts(algo))
            .cloned()
            .collect();

        Self {
            field: field.label(),
            category,
            offered: offered.clone(),
            accepted,
        }
    }

    /// True when the server offers at least one acceptable algorithm
    pub fn has_overlap(&self) -> bool {
        !self.accepted.is_empty()
    }

    pub fn format_line(&self) -> String {
        if self.has_overlap() {
            let accepted: Vec<&str> = self.accepted.iter().map(String::as_str).collect();
            format!("{} ({}): {}", self.category, self.field, accepted.join(", "))
        } else {
            format!("{} ({}): NO OVERLAP!!", self.category, self.field)
        }
    }
}

/// Overlap report for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapReport {
    pub host: String,
    pub entries: Vec<OverlapEntry>,
}

impl OverlapReport {
    pub fn compute(host: impl Into<String>, negotiation: &NegotiationReport) -> Self {
        let entries = negotiation
            .iter()
            .map(|(field, offered)| OverlapEntry::compute(field, offered))
            .collect();

        Self {
            host: host.into(),
            entries,
        }
    }

    /// Fields with no acceptable algorithm at all
    pub fn missing_overlap(&self) -> impl Iterator<Item = &OverlapEntry> {
        self.entries.iter().filter(|entry| !entry.has_overlap())
    }

    pub fn is_compliant(&self) -> bool {
        self.missing_overlap().next().is_none()
    }

    /// Human readable rendering
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = format!(
            "{} Key Exchange proposals overlap for {}: {}\n",
            rule, self.host, rule
        );
        for entry in &self.entries {
            out.push_str(&entry.format_line());
            out.push('\n');
        }
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
