//! View models produced by the renderer and consumed by every output
//! surface (on-screen JSON and PDF). Excerpts here are already truncated
//! for display; the underlying results keep the full text.

use serde::{Deserialize, Serialize};

use shared_types::{MissingClause, Severity};

/// Fixed disclaimer shown on every report
pub const DISCLAIMER: &str = "This report is generated automatically from retrieved document \
     excerpts and is not legal advice. Verify all findings against the executed agreement and \
     the applicable MahaRERA provisions before acting on them.";

/// A truncated excerpt tied to its source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcerptView {
    pub filename: String,
    pub excerpt: String,
}

/// One red flag, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagView {
    pub severity: Severity,
    pub rule_id: String,
    pub domain: String,
    pub reason: String,
    pub clause_source: Option<ExcerptView>,
    pub authority_support: Vec<ExcerptView>,
}

/// Missing clauses of one severity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingGroup {
    pub severity: Severity,
    pub items: Vec<MissingClause>,
}

/// Executive-summary block: clause coverage plus missing groups in fixed
/// critical → high → medium order (empty groups are dropped)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceBlock {
    pub is_compliant: bool,
    pub compliant_count: u32,
    pub total_checks: u32,
    pub missing_groups: Vec<MissingGroup>,
}

/// Red-flag block: per-tier counts (non-zero tiers only, severity order)
/// and the flags themselves, sorted by severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagBlock {
    pub counts: Vec<(Severity, usize)>,
    pub flags: Vec<FlagView>,
}

/// A source passage reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceView {
    pub filename: String,
    pub section: Option<String>,
    pub score: f64,
    pub snippet: String,
}

/// The complete single-query report view.
///
/// `no_red_flags_banner` is driven by `decision.is_red_flag` and is
/// independent of `compliance`: the backend derives the two from
/// different rule sets, so a compliant document with the banner off (or
/// the reverse) is a valid, displayable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub title: String,
    pub generated_on: String,
    pub compliance: Option<ComplianceBlock>,
    pub red_flags: Option<RedFlagBlock>,
    pub no_red_flags_banner: bool,
    pub answer: String,
    pub sources: Option<Vec<SourceView>>,
    pub disclaimer: String,
}

/// One document inside a batch report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDocView {
    pub filename: String,
    pub error: Option<String>,
    pub red_flag_count: usize,
    /// Clause coverage as (found, expected), when a summary was produced
    pub coverage: Option<(u32, u32)>,
    /// First few flags shown inline; the rest collapse into `more_flags`
    pub top_flags: Vec<FlagView>,
    pub more_flags: usize,
}

/// Aggregate header lines for a batch report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeaderView {
    pub total_documents: u32,
    pub processed: u32,
    pub documents_with_issues: u32,
    pub total_red_flags: u32,
    pub total_critical: u32,
    pub total_missing_clauses: u32,
}

/// The complete batch report view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReportView {
    pub title: String,
    pub generated_on: String,
    pub header: BatchHeaderView,
    pub documents: Vec<BatchDocView>,
    pub disclaimer: String,
}
