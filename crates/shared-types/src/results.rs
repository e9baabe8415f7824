//! Normalized query and batch results as consumed by the renderers.
//!
//! `RenderableResult` is the client-side view of one `/api/query` response;
//! `BatchResult` aggregates one `/api/batch-process` response. Both are
//! immutable snapshots; renderers never mutate them.

use serde::{Deserialize, Serialize};

use crate::types::{ComplianceSummary, RedFlag};

/// One retrieved passage backing the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHit {
    pub filename: String,
    #[serde(default)]
    pub section: Option<String>,
    pub score: f64,
    pub text: String,
}

/// The backend's red-flag decision, independent of the clause-coverage
/// summary. The two can disagree (a document may cover every required
/// clause and still carry a red flag); both signals are preserved and
/// displayed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub is_red_flag: bool,
    #[serde(default)]
    pub override_llm_decision: bool,
    pub is_compliant: bool,
}

/// A single query response, normalized for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableResult {
    pub answer_text: String,
    #[serde(default)]
    pub sources: Vec<SourceHit>,
    #[serde(default)]
    pub red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub compliance_summary: Option<ComplianceSummary>,
    #[serde(default)]
    pub decision: Option<Decision>,
    pub is_compliance_check: bool,
}

/// Per-document outcome inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Processed,
    Error,
}

/// One document's entry in a batch response. Entries are independent: an
/// `Error` entry never invalidates its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub filename: String,
    pub status: BatchStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub compliance_summary: Option<ComplianceSummary>,
}

impl BatchEntry {
    /// An entry "has issues" when it carries red flags or a non-compliant
    /// summary. Error entries are counted separately, not as issues.
    pub fn has_issues(&self) -> bool {
        !self.red_flags.is_empty()
            || self
                .compliance_summary
                .as_ref()
                .is_some_and(|s| !s.is_compliant)
    }
}

/// Aggregate counters for a whole batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_documents: u32,
    pub processed: u32,
    pub documents_with_issues: u32,
    pub total_red_flags: u32,
    pub total_critical: u32,
    pub total_missing_clauses: u32,
}

/// A complete batch outcome: one aggregate plus per-document entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub summary: BatchSummary,
    pub results: Vec<BatchEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RedFlag, Severity};

    #[test]
    fn batch_status_wire_format() {
        assert_eq!(serde_json::to_string(&BatchStatus::Error).unwrap(), "\"error\"");
        let parsed: BatchStatus = serde_json::from_str("\"processed\"").unwrap();
        assert_eq!(parsed, BatchStatus::Processed);
    }

    #[test]
    fn entry_with_red_flags_has_issues() {
        let entry = BatchEntry {
            filename: "agreement.pdf".to_string(),
            status: BatchStatus::Processed,
            error: None,
            red_flags: vec![RedFlag {
                rule_id: "RF-REFUND-001".to_string(),
                domain: "refund".to_string(),
                severity: Severity::High,
                reason: "Clause waives refund rights.".to_string(),
                clause_source: None,
                authority_support: vec![],
            }],
            compliance_summary: None,
        };
        assert!(entry.has_issues());
    }

    #[test]
    fn clean_entry_has_no_issues() {
        let entry = BatchEntry {
            filename: "agreement.pdf".to_string(),
            status: BatchStatus::Processed,
            error: None,
            red_flags: vec![],
            compliance_summary: Some(ComplianceSummary::from_missing(5, vec![], vec![], vec![])),
        };
        assert!(!entry.has_issues());
    }

    #[test]
    fn renderable_result_accepts_minimal_payload() {
        let json = r#"{"answer_text":"The agreement covers possession.","is_compliance_check":false}"#;
        let result: RenderableResult = serde_json::from_str(json).unwrap();
        assert!(result.sources.is_empty());
        assert!(result.red_flags.is_empty());
        assert!(result.compliance_summary.is_none());
    }
}
