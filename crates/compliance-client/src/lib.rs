//! Client-side orchestration for the RERA compliance checker.
//!
//! This crate turns UI state into backend requests and backend responses
//! into renderable structures. It owns:
//!
//! - [`SelectionStore`]: the two selection sets (user documents and
//!   regulatory documents) and their derived checkbox status
//! - [`QueryOrchestrator`]: the Idle/Submitting state machine around
//!   `/api/query`, including compliance-check preconditions
//! - [`BatchOrchestrator`]: multi-document processing against one
//!   regulatory selection, with coarse progress phases
//! - the `/api` wire contract and the [`ApiTransport`] capability the
//!   browser app injects (fetch in wasm, a scripted mock in tests)
//!
//! No DOM and no direct I/O live here; everything network-shaped goes
//! through the injected transport, which keeps the whole crate testable
//! off-browser.

pub mod api;
pub mod batch;
pub mod error;
pub mod orchestrator;
pub mod selection;

pub use api::{ApiClient, ApiTransport, BatchOptions, QueryRequest, TransportError};
pub use batch::{BatchOrchestrator, BatchPhase};
pub use error::ClientError;
pub use orchestrator::QueryOrchestrator;
pub use selection::{Category, SelectionStatus, SelectionStore};
