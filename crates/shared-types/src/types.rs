//! Core domain types for documents and compliance findings.
//!
//! Field names follow the backend JSON wire format (snake_case), so these
//! types deserialize straight out of API responses.

use serde::{Deserialize, Serialize};

/// A user document known to the backend index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub filename: String, // unique key
    #[serde(default)]
    pub char_count: u64,
    #[serde(default)]
    pub chunk_count: u32,
}

/// Category of a regulatory reference document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Law,
    Rule,
    Regulation,
    Circular,
    Order,
    Form,
}

/// A MahaRERA reference document used as the compliance baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryDocument {
    pub filename: String, // unique key
    pub title: String,
    pub doc_type: DocType,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub char_count: u64,
}

/// Severity tier of a red flag. Declaration order is the fixed display
/// order (CRITICAL first), so sorting ascending by this enum sorts for
/// display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// Where in the user's document a flagged clause was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseSource {
    pub filename: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

/// An excerpt from a regulatory document supporting a red flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityExcerpt {
    pub filename: String,
    pub excerpt: String,
}

/// A detected clause or omission judged non-compliant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub rule_id: String,
    pub domain: String,
    pub severity: Severity,
    pub reason: String,
    #[serde(default)]
    pub clause_source: Option<ClauseSource>,
    #[serde(default)]
    pub authority_support: Vec<AuthorityExcerpt>,
}

/// A required clause that was not found in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingClause {
    pub domain: String,
    pub description: String,
}

/// Aggregate of required-clause checks: found vs. expected, with missing
/// clauses grouped by importance.
///
/// Invariant: `is_compliant == (compliant_count == total_checks)`, and all
/// three missing lists are empty exactly when `is_compliant` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_checks: u32,
    pub compliant_count: u32,
    pub missing_count: u32,
    #[serde(default)]
    pub critical_missing: Vec<MissingClause>,
    #[serde(default)]
    pub high_missing: Vec<MissingClause>,
    #[serde(default)]
    pub medium_missing: Vec<MissingClause>,
    pub is_compliant: bool,
}

impl ComplianceSummary {
    /// Build a summary from the missing-clause groups, deriving the counts
    /// and the compliance flag so the invariant holds by construction.
    pub fn from_missing(
        total_checks: u32,
        critical_missing: Vec<MissingClause>,
        high_missing: Vec<MissingClause>,
        medium_missing: Vec<MissingClause>,
    ) -> Self {
        let missing_count =
            (critical_missing.len() + high_missing.len() + medium_missing.len()) as u32;
        let compliant_count = total_checks.saturating_sub(missing_count);
        Self {
            total_checks,
            compliant_count,
            missing_count,
            critical_missing,
            high_missing,
            medium_missing,
            is_compliant: missing_count == 0,
        }
    }

    /// Total missing clauses across all severity groups
    pub fn missing_total(&self) -> usize {
        self.critical_missing.len() + self.high_missing.len() + self.medium_missing.len()
    }
}
