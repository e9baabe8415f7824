//! The `/api` wire contract and the transport capability behind it.
//!
//! [`ApiTransport`] is the only way anything in this crate reaches the
//! network. The browser app injects a fetch-based implementation; tests
//! inject a scripted mock. [`ApiClient`] layers the typed endpoints on
//! top and decodes responses into `shared-types` structures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_types::{BatchResult, Document, RegulatoryDocument, UsageStats};

use thiserror::Error;

/// Transport-level failure. Carries enough for a user-facing message; the
/// caller decides whether it is surfaced or (for polls) only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

/// Injected HTTP capability. GET/POST JSON against the `/api` base path.
///
/// Async-fn-in-trait keeps this object-free: orchestrators are generic
/// over the transport, which compiles both natively and to wasm.
pub trait ApiTransport {
    fn get(&self, path: &str) -> impl std::future::Future<Output = Result<Value, TransportError>>;
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Value, TransportError>>;
}

/// Request body for `/api/query`. Empty selections are omitted entirely,
/// which the backend reads as "search all documents".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: u32,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_documents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_maharera: Option<Vec<String>>,
    pub compliance_check: bool,
}

/// Raw `/api/query` response. Optional blocks default to empty so a plain
/// (non-compliance) answer decodes without them.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<shared_types::SourceHit>,
    #[serde(default)]
    pub red_flags: Vec<shared_types::RedFlag>,
    #[serde(default)]
    pub compliance_summary: Option<shared_types::ComplianceSummary>,
    #[serde(default)]
    pub decision: Option<shared_types::Decision>,
}

/// Batch options. The backend reads these camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    pub red_flags: bool,
    pub compliance: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            red_flags: true,
            compliance: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct BatchRequest<'a> {
    document_ids: &'a [String],
    maharera_ids: &'a [String],
    options: BatchOptions,
}

#[derive(Debug, Deserialize)]
struct DocumentListing {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct RegulatoryListing {
    #[serde(default)]
    documents: Vec<RegulatoryDocument>,
}

#[derive(Debug, Deserialize)]
struct UsageEnvelope {
    usage: UsageStats,
}

/// Typed endpoints over an [`ApiTransport`]
#[derive(Debug, Clone)]
pub struct ApiClient<T: ApiTransport> {
    transport: T,
}

impl<T: ApiTransport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn decode<D: serde::de::DeserializeOwned>(value: Value) -> Result<D, TransportError> {
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// GET `/status`: indexed document count
    pub async fn status(&self) -> Result<u64, TransportError> {
        let value = self.transport.get("/status").await?;
        value
            .get("documents")
            .and_then(Value::as_u64)
            .ok_or_else(|| TransportError::Decode("missing documents count".to_string()))
    }

    /// GET `/documents`: user document listing
    pub async fn list_documents(&self) -> Result<Vec<Document>, TransportError> {
        let value = self.transport.get("/documents").await?;
        Self::decode::<DocumentListing>(value).map(|l| l.documents)
    }

    /// GET `/maharera`: regulatory document listing
    pub async fn list_regulatory(&self) -> Result<Vec<RegulatoryDocument>, TransportError> {
        let value = self.transport.get("/maharera").await?;
        Self::decode::<RegulatoryListing>(value).map(|l| l.documents)
    }

    /// POST `/delete`: remove one user document from the index
    pub async fn delete_document(&self, filename: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({ "filename": filename });
        self.transport.post("/delete", &body).await.map(|_| ())
    }

    /// POST `/maharera/delete`: drop every regulatory document
    pub async fn delete_all_regulatory(&self) -> Result<(), TransportError> {
        self.transport
            .post("/maharera/delete", &Value::Null)
            .await
            .map(|_| ())
    }

    /// POST `/query`
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
        let body =
            serde_json::to_value(request).map_err(|e| TransportError::Decode(e.to_string()))?;
        let value = self.transport.post("/query", &body).await?;
        Self::decode(value)
    }

    /// POST `/batch-process`
    pub async fn batch_process(
        &self,
        document_ids: &[String],
        maharera_ids: &[String],
        options: BatchOptions,
    ) -> Result<BatchResult, TransportError> {
        let request = BatchRequest {
            document_ids,
            maharera_ids,
            options,
        };
        let body =
            serde_json::to_value(&request).map_err(|e| TransportError::Decode(e.to_string()))?;
        let value = self.transport.post("/batch-process", &body).await?;
        Self::decode(value)
    }

    /// GET `/usage`: best-effort usage counters
    pub async fn usage(&self) -> Result<UsageStats, TransportError> {
        let value = self.transport.get("/usage").await?;
        Self::decode::<UsageEnvelope>(value).map(|e| e.usage)
    }

    /// POST `/usage/reset`
    pub async fn reset_usage(&self) -> Result<(), TransportError> {
        self.transport
            .post("/usage/reset", &Value::Null)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_omitted_from_the_wire() {
        let request = QueryRequest {
            question: "Is the possession date specified?".to_string(),
            top_k: 3,
            language: "auto".to_string(),
            selected_documents: None,
            selected_maharera: Some(vec!["rera_rules.pdf".to_string()]),
            compliance_check: false,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("selected_documents").is_none());
        assert_eq!(wire["selected_maharera"][0], "rera_rules.pdf");
    }

    #[test]
    fn batch_options_serialize_camel_case() {
        let wire = serde_json::to_value(BatchOptions::default()).unwrap();
        assert_eq!(wire["redFlags"], true);
        assert_eq!(wire["compliance"], true);
    }

    #[test]
    fn query_response_decodes_without_compliance_blocks() {
        let response: QueryResponse = serde_json::from_str(
            r#"{"answer":"Possession is due by December 2026.","sources":[]}"#,
        )
        .unwrap();
        assert!(response.red_flags.is_empty());
        assert!(response.compliance_summary.is_none());
        assert!(response.decision.is_none());
    }
}
