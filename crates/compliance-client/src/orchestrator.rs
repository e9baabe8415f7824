//! Query orchestration: UI state in, renderable result out.
//!
//! The orchestrator is a two-state machine (`Idle` / `Submitting`). A
//! submit while another request is in flight is rejected without touching
//! the network, so at most one `/query` call exists at a time. Success and
//! failure both return the machine to idle.

use std::cell::Cell;

use tracing::warn;

use shared_types::{Preferences, RenderableResult};

use crate::api::{ApiClient, ApiTransport, QueryRequest, QueryResponse};
use crate::error::ClientError;
use crate::selection::{Category, SelectionStore};

/// Widened retrieval depth for compliance checks: thoroughness over speed
const COMPLIANCE_TOP_K: u32 = 10;

/// Backend-imposed cap on question length
const MAX_QUESTION_CHARS: usize = 2000;

/// Fixed prompt used when the user triggers a compliance check rather
/// than typing a question
const COMPLIANCE_QUESTION: &str = "Review the selected agreement documents against the selected \
     MahaRERA documents. Report every non-compliant clause and every required clause that is \
     missing, with the supporting regulatory provision for each finding.";

/// Clears the submitting flag on every exit path, including early `?`
struct FlightGuard<'a>(&'a Cell<bool>);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Serializes `/query` requests and normalizes the responses
#[derive(Debug)]
pub struct QueryOrchestrator<T: ApiTransport> {
    api: ApiClient<T>,
    submitting: Cell<bool>,
}

impl<T: ApiTransport> QueryOrchestrator<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            submitting: Cell::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    fn begin(&self) -> Result<FlightGuard<'_>, ClientError> {
        if self.submitting.get() {
            return Err(ClientError::Busy);
        }
        self.submitting.set(true);
        Ok(FlightGuard(&self.submitting))
    }

    /// Submit a free-text question against the current selection.
    ///
    /// An empty selection is sent as "search all". Exactly one network
    /// call is made per accepted submit; transport failures surface as a
    /// user-facing message, never as a panic or a retry.
    pub async fn submit(
        &self,
        store: &SelectionStore,
        question: &str,
        prefs: &Preferences,
    ) -> Result<RenderableResult, ClientError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ClientError::Validation(
                "Please enter a question".to_string(),
            ));
        }
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(ClientError::Validation(format!(
                "Question too long (max {} characters)",
                MAX_QUESTION_CHARS
            )));
        }

        let _guard = self.begin()?;
        let request = QueryRequest {
            question: question.to_string(),
            top_k: prefs.effective_top_k(),
            language: prefs.language.clone(),
            selected_documents: snapshot(store, Category::Documents),
            selected_maharera: snapshot(store, Category::Regulatory),
            compliance_check: false,
        };
        self.dispatch(request, false).await
    }

    /// Run a compliance check against the selected regulatory documents.
    ///
    /// Requires at least one selected MahaRERA document and at least one
    /// listed user document; either precondition failing rejects the
    /// submit before any network call.
    pub async fn submit_compliance_check(
        &self,
        store: &SelectionStore,
        prefs: &Preferences,
    ) -> Result<RenderableResult, ClientError> {
        if store.selected_count(Category::Regulatory) == 0 {
            return Err(ClientError::Validation(
                "Select at least one MahaRERA document to check compliance against".to_string(),
            ));
        }
        if store.listing_len(Category::Documents) == 0 {
            return Err(ClientError::Validation(
                "Upload at least one document before running a compliance check".to_string(),
            ));
        }

        let _guard = self.begin()?;
        let request = QueryRequest {
            question: COMPLIANCE_QUESTION.to_string(),
            top_k: COMPLIANCE_TOP_K,
            language: prefs.language.clone(),
            selected_documents: snapshot(store, Category::Documents),
            selected_maharera: snapshot(store, Category::Regulatory),
            compliance_check: true,
        };
        self.dispatch(request, true).await
    }

    async fn dispatch(
        &self,
        request: QueryRequest,
        is_compliance_check: bool,
    ) -> Result<RenderableResult, ClientError> {
        match self.api.query(&request).await {
            Ok(response) => Ok(normalize(response, is_compliance_check)),
            Err(err) => {
                warn!(error = %err, "query failed");
                Err(ClientError::Transport(err.to_string()))
            }
        }
    }
}

/// Selection snapshot for the wire: `None` when empty, which the backend
/// reads as "search all"
fn snapshot(store: &SelectionStore, category: Category) -> Option<Vec<String>> {
    let selected = store.selected(category);
    if selected.is_empty() {
        None
    } else {
        Some(selected)
    }
}

fn normalize(response: QueryResponse, is_compliance_check: bool) -> RenderableResult {
    RenderableResult {
        answer_text: response.answer,
        sources: response.sources,
        red_flags: response.red_flags,
        compliance_summary: response.compliance_summary,
        decision: response.decision,
        is_compliance_check,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TransportError;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    /// Yields once before completing, so a second submit can run while
    /// the first is suspended at the network await point.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[derive(Clone, Default)]
    struct MockTransport {
        calls: Rc<RefCell<Vec<String>>>,
        response: Rc<RefCell<Value>>,
    }

    impl MockTransport {
        fn with_response(response: Value) -> Self {
            Self {
                calls: Rc::default(),
                response: Rc::new(RefCell::new(response)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl ApiTransport for MockTransport {
        async fn get(&self, path: &str) -> Result<Value, TransportError> {
            self.calls.borrow_mut().push(path.to_string());
            Ok(self.response.borrow().clone())
        }

        async fn post(&self, path: &str, _body: &Value) -> Result<Value, TransportError> {
            self.calls.borrow_mut().push(path.to_string());
            YieldOnce(false).await;
            Ok(self.response.borrow().clone())
        }
    }

    fn answer_payload() -> Value {
        json!({
            "answer": "Possession is due by December 2026.",
            "sources": [
                {"filename": "agreement.pdf", "score": 0.91, "text": "possession shall be delivered"}
            ]
        })
    }

    fn store_with_docs() -> SelectionStore {
        let mut store = SelectionStore::new();
        store.set_listing(Category::Documents, ["agreement.pdf", "annexure.pdf"]);
        store.set_listing(Category::Regulatory, ["rera_rules.pdf"]);
        store
    }

    #[tokio::test]
    async fn empty_question_is_rejected_without_network_call() {
        let mock = MockTransport::with_response(answer_payload());
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        let result = orch
            .submit(&store_with_docs(), "   ", &Preferences::default())
            .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn overlong_question_is_rejected() {
        let mock = MockTransport::with_response(answer_payload());
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        let question = "x".repeat(MAX_QUESTION_CHARS + 1);
        let result = orch
            .submit(&store_with_docs(), &question, &Preferences::default())
            .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn successful_submit_normalizes_the_response() {
        let mock = MockTransport::with_response(answer_payload());
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        let result = orch
            .submit(&store_with_docs(), "When is possession due?", &Preferences::default())
            .await
            .unwrap();
        assert_eq!(result.answer_text, "Possession is due by December 2026.");
        assert_eq!(result.sources.len(), 1);
        assert!(!result.is_compliance_check);
        assert!(!orch.is_submitting());
    }

    #[tokio::test]
    async fn second_submit_while_submitting_is_a_noop() {
        let mock = MockTransport::with_response(answer_payload());
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        let store = store_with_docs();
        let prefs = Preferences::default();

        let first = orch.submit(&store, "When is possession due?", &prefs);
        let second = orch.submit(&store, "When is possession due?", &prefs);
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert_eq!(second, Err(ClientError::Busy));
        // Exactly one network call for two back-to-back submits
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn compliance_check_requires_regulatory_selection() {
        let mock = MockTransport::with_response(answer_payload());
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        // Two listed documents but nothing selected on the regulatory side
        let store = store_with_docs();
        let result = orch
            .submit_compliance_check(&store, &Preferences::default())
            .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn compliance_check_requires_listed_documents() {
        let mock = MockTransport::with_response(answer_payload());
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        let mut store = SelectionStore::new();
        store.set_listing(Category::Regulatory, ["rera_rules.pdf"]);
        store.toggle(Category::Regulatory, "rera_rules.pdf");
        let result = orch
            .submit_compliance_check(&store, &Preferences::default())
            .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn compliance_check_widens_retrieval_and_tags_the_result() {
        let mock = MockTransport::with_response(json!({
            "answer": "One required clause is missing.",
            "sources": [],
            "red_flags": [],
            "compliance_summary": {
                "total_checks": 5,
                "compliant_count": 4,
                "missing_count": 1,
                "critical_missing": [],
                "high_missing": [{"domain": "possession", "description": "Possession date missing"}],
                "medium_missing": [],
                "is_compliant": false
            },
            "decision": {"is_red_flag": false, "override_llm_decision": false, "is_compliant": false}
        }));
        let orch = QueryOrchestrator::new(ApiClient::new(mock.clone()));
        let mut store = store_with_docs();
        store.toggle(Category::Regulatory, "rera_rules.pdf");

        let result = orch
            .submit_compliance_check(&store, &Preferences::default())
            .await
            .unwrap();
        assert!(result.is_compliance_check);
        let summary = result.compliance_summary.unwrap();
        assert!(!summary.is_compliant);
        assert_eq!(summary.high_missing.len(), 1);
        // Decision travels independently of the summary
        assert!(!result.decision.unwrap().is_red_flag);
    }

    #[tokio::test]
    async fn transport_failure_returns_to_idle_with_a_message() {
        #[derive(Clone)]
        struct FailingTransport;

        impl ApiTransport for FailingTransport {
            async fn get(&self, _path: &str) -> Result<Value, TransportError> {
                Err(TransportError::Network("connection refused".to_string()))
            }

            async fn post(&self, _path: &str, _body: &Value) -> Result<Value, TransportError> {
                Err(TransportError::Status {
                    code: 503,
                    message: "No index loaded".to_string(),
                })
            }
        }

        let orch = QueryOrchestrator::new(ApiClient::new(FailingTransport));
        let result = orch
            .submit(&store_with_docs(), "When is possession due?", &Preferences::default())
            .await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert!(!orch.is_submitting());
    }
}
