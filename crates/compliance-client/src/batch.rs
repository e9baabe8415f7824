//! Batch processing: several user documents against one regulatory
//! selection, in a single backend round-trip.
//!
//! Progress is coarse by design: the backend exposes no per-document
//! stream, so the client reports discrete phases. Cancellation mid-flight
//! is not supported: the request is fire-and-forget once dispatched, and
//! "cancel" in the UI only means losing interest in the response. This is
//! a known limitation of the backend contract, not something to paper
//! over client-side.

use std::cell::Cell;

use tracing::warn;

use shared_types::BatchResult;

use crate::api::{ApiClient, ApiTransport, BatchOptions};
use crate::error::ClientError;

/// Coarse progress phases reported to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Queued,
    Processing,
    Complete,
    Failed,
}

impl BatchPhase {
    /// Progress-bar percentage for the phase
    pub fn percent(&self) -> u8 {
        match self {
            BatchPhase::Queued => 10,
            BatchPhase::Processing => 70,
            BatchPhase::Complete | BatchPhase::Failed => 100,
        }
    }
}

/// Runs batch compliance requests, one at a time
#[derive(Debug)]
pub struct BatchOrchestrator<T: ApiTransport> {
    api: ApiClient<T>,
    in_flight: Cell<bool>,
}

struct FlightGuard<'a>(&'a Cell<bool>);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T: ApiTransport> BatchOrchestrator<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            in_flight: Cell::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.get()
    }

    /// Process `document_ids` against `regulatory_ids` in one request.
    ///
    /// `progress` receives each phase transition. Per-document failures
    /// inside the batch are recorded per entry by the backend and do not
    /// fail the call; only validation and transport failures do.
    pub async fn start<F>(
        &self,
        document_ids: &[String],
        regulatory_ids: &[String],
        options: BatchOptions,
        mut progress: F,
    ) -> Result<BatchResult, ClientError>
    where
        F: FnMut(BatchPhase),
    {
        if document_ids.is_empty() {
            return Err(ClientError::Validation(
                "Select at least one document for batch processing".to_string(),
            ));
        }

        if self.in_flight.get() {
            return Err(ClientError::Busy);
        }
        self.in_flight.set(true);
        let _guard = FlightGuard(&self.in_flight);

        progress(BatchPhase::Queued);
        progress(BatchPhase::Processing);
        match self
            .api
            .batch_process(document_ids, regulatory_ids, options)
            .await
        {
            Ok(result) => {
                progress(BatchPhase::Complete);
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "batch processing failed");
                progress(BatchPhase::Failed);
                Err(ClientError::Transport(err.to_string()))
            }
        }
    }
}
