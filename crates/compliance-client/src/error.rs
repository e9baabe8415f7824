use thiserror::Error;

/// Failures surfaced to the user. Nothing here is fatal: every variant
/// maps to a visible message and the orchestrator returns to idle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Rejected before any network call (empty question, missing
    /// selections, and similar precondition failures)
    #[error("{0}")]
    Validation(String),

    /// A request is already in flight; the trigger should have been
    /// disabled for the duration
    #[error("A request is already in progress")]
    Busy,

    /// Network failure, non-success HTTP status, or a response the client
    /// could not decode. Never retried automatically: repeating an
    /// LLM-backed request risks duplicate cost.
    #[error("{0}")]
    Transport(String),
}
