//! Domain types shared across the RERAScan client crates: documents,
//! red flags, compliance summaries, query and batch results, and user
//! preferences. Everything here mirrors the backend's JSON wire format.

pub mod prefs;
pub mod results;
pub mod types;

pub use prefs::{Preferences, UsageStats};
pub use results::{
    BatchEntry, BatchResult, BatchStatus, BatchSummary, Decision, RenderableResult, SourceHit,
};
pub use types::{
    AuthorityExcerpt, ClauseSource, ComplianceSummary, DocType, Document, MissingClause, RedFlag,
    RegulatoryDocument, Severity,
};
