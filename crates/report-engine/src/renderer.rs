//! Pure mapping from results to view models. No I/O, no mutation of the
//! input; callers hand in immutable snapshots and render the view model
//! however they like.

use shared_types::{BatchResult, BatchStatus, RedFlag, RenderableResult, Severity};

use crate::view::{
    BatchDocView, BatchHeaderView, BatchReportView, ComplianceBlock, ExcerptView, FlagView,
    MissingGroup, RedFlagBlock, ReportView, SourceView, DISCLAIMER,
};

/// Display cap for excerpts (matches the backend's excerpt window)
const EXCERPT_MAX_CHARS: usize = 200;

/// Source snippets get a little more room than clause excerpts
const SNIPPET_MAX_CHARS: usize = 300;

/// Flags shown inline per document in a batch report
const BATCH_TOP_FLAGS: usize = 3;

const REPORT_TITLE: &str = "MahaRERA Compliance Report";
const BATCH_REPORT_TITLE: &str = "Batch Compliance Report";

/// Hard-truncate to `max` characters with a trailing ellipsis. Display
/// only; the underlying result keeps the full text.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

fn flag_view(flag: &RedFlag) -> FlagView {
    FlagView {
        severity: flag.severity,
        rule_id: flag.rule_id.clone(),
        domain: flag.domain.clone(),
        reason: flag.reason.clone(),
        clause_source: flag.clause_source.as_ref().map(|source| ExcerptView {
            filename: source.filename.clone(),
            excerpt: truncate(source.excerpt.as_deref().unwrap_or_default(), EXCERPT_MAX_CHARS),
        }),
        authority_support: flag
            .authority_support
            .iter()
            .map(|support| ExcerptView {
                filename: support.filename.clone(),
                excerpt: truncate(&support.excerpt, EXCERPT_MAX_CHARS),
            })
            .collect(),
    }
}

/// Flags sorted into the fixed CRITICAL → LOW display order (stable
/// within a tier)
fn sorted_flags(flags: &[RedFlag]) -> Vec<FlagView> {
    let mut views: Vec<FlagView> = flags.iter().map(flag_view).collect();
    views.sort_by_key(|f| f.severity);
    views
}

fn tier_counts(flags: &[FlagView]) -> Vec<(Severity, usize)> {
    [Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
        .into_iter()
        .filter_map(|tier| {
            let count = flags.iter().filter(|f| f.severity == tier).count();
            (count > 0).then_some((tier, count))
        })
        .collect()
}

fn compliance_block(result: &RenderableResult) -> Option<ComplianceBlock> {
    if !result.is_compliance_check {
        return None;
    }
    let summary = result.compliance_summary.as_ref()?;
    let groups = [
        (Severity::Critical, &summary.critical_missing),
        (Severity::High, &summary.high_missing),
        (Severity::Medium, &summary.medium_missing),
    ];
    Some(ComplianceBlock {
        is_compliant: summary.is_compliant,
        compliant_count: summary.compliant_count,
        total_checks: summary.total_checks,
        missing_groups: groups
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(severity, items)| MissingGroup {
                severity,
                items: items.clone(),
            })
            .collect(),
    })
}

/// Build the single-query report view.
///
/// The compliance and red-flag blocks are suppressed entirely for
/// non-compliance queries, even when the backend happened to include the
/// fields.
pub fn render(result: &RenderableResult, generated_on: &str) -> ReportView {
    let red_flags = if result.is_compliance_check && !result.red_flags.is_empty() {
        let flags = sorted_flags(&result.red_flags);
        Some(RedFlagBlock {
            counts: tier_counts(&flags),
            flags,
        })
    } else {
        None
    };

    let sources: Vec<SourceView> = result
        .sources
        .iter()
        .map(|hit| SourceView {
            filename: hit.filename.clone(),
            section: hit.section.clone(),
            score: hit.score,
            snippet: truncate(&hit.text, SNIPPET_MAX_CHARS),
        })
        .collect();

    ReportView {
        title: REPORT_TITLE.to_string(),
        generated_on: generated_on.to_string(),
        compliance: compliance_block(result),
        red_flags,
        no_red_flags_banner: result.is_compliance_check
            && result.decision.is_some_and(|d| !d.is_red_flag),
        answer: result.answer_text.clone(),
        sources: (!sources.is_empty()).then_some(sources),
        disclaimer: DISCLAIMER.to_string(),
    }
}

/// Build the batch report view. Error entries render an error line and
/// never suppress their siblings.
pub fn render_batch(batch: &BatchResult, generated_on: &str) -> BatchReportView {
    let documents = batch
        .results
        .iter()
        .map(|entry| {
            if entry.status == BatchStatus::Error {
                return BatchDocView {
                    filename: entry.filename.clone(),
                    error: Some(
                        entry
                            .error
                            .clone()
                            .unwrap_or_else(|| "Processing failed".to_string()),
                    ),
                    red_flag_count: 0,
                    coverage: None,
                    top_flags: Vec::new(),
                    more_flags: 0,
                };
            }
            let flags = sorted_flags(&entry.red_flags);
            let more = flags.len().saturating_sub(BATCH_TOP_FLAGS);
            BatchDocView {
                filename: entry.filename.clone(),
                error: None,
                red_flag_count: flags.len(),
                coverage: entry
                    .compliance_summary
                    .as_ref()
                    .map(|s| (s.compliant_count, s.total_checks)),
                top_flags: flags.into_iter().take(BATCH_TOP_FLAGS).collect(),
                more_flags: more,
            }
        })
        .collect();

    BatchReportView {
        title: BATCH_REPORT_TITLE.to_string(),
        generated_on: generated_on.to_string(),
        header: BatchHeaderView {
            total_documents: batch.summary.total_documents,
            processed: batch.summary.processed,
            documents_with_issues: batch.summary.documents_with_issues,
            total_red_flags: batch.summary.total_red_flags,
            total_critical: batch.summary.total_critical,
            total_missing_clauses: batch.summary.total_missing_clauses,
        },
        documents,
        disclaimer: DISCLAIMER.to_string(),
    }
}
