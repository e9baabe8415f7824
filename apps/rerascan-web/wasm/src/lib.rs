//! Browser entry point for the RERAScan compliance client.
//!
//! [`ComplianceApp`] owns the selection store, the query and batch
//! orchestrators, and the last results, and exposes them to the page as
//! one wasm-bindgen object. View models cross the boundary as plain JS
//! objects; PDFs cross as byte arrays the page turns into a download.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use compliance_client::{
    ApiClient, BatchOptions, BatchOrchestrator, BatchPhase, Category, QueryOrchestrator,
    SelectionStore,
};
use report_engine::{render, render_batch, LopdfCanvas, PdfReportBuilder};
use shared_types::{BatchResult, Preferences, RenderableResult};

pub mod poller;
pub mod storage;
pub mod transport;

pub use poller::start_status_polling;
pub use storage::{clear_preferences, load_preferences, save_preferences};
pub use transport::FetchTransport;

fn parse_category(name: &str) -> Option<Category> {
    match name {
        "documents" => Some(Category::Documents),
        "maharera" | "regulatory" => Some(Category::Regulatory),
        _ => None,
    }
}

fn category_arg(name: &str) -> Result<Category, JsValue> {
    parse_category(name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown selection category: {}", name)))
}

fn phase_name(phase: BatchPhase) -> &'static str {
    match phase {
        BatchPhase::Queued => "queued",
        BatchPhase::Processing => "processing",
        BatchPhase::Complete => "complete",
        BatchPhase::Failed => "failed",
    }
}

/// Today as a display string and a date, from the browser clock
fn today() -> (String, chrono::NaiveDate) {
    let iso = js_sys::Date::new_0()
        .to_iso_string()
        .as_string()
        .unwrap_or_default();
    let day: String = iso.chars().take(10).collect();
    let date = chrono::NaiveDate::parse_from_str(&day, "%Y-%m-%d").unwrap_or_default();
    (day, date)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The page-facing application object
#[wasm_bindgen]
pub struct ComplianceApp {
    api: ApiClient<FetchTransport>,
    queries: QueryOrchestrator<FetchTransport>,
    batches: BatchOrchestrator<FetchTransport>,
    store: RefCell<SelectionStore>,
    prefs: RefCell<Preferences>,
    last_result: RefCell<Option<RenderableResult>>,
    last_batch: RefCell<Option<BatchResult>>,
}

#[wasm_bindgen]
impl ComplianceApp {
    /// Create the app bound to an `/api` base URL. Preferences are loaded
    /// from localStorage, falling back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(api_base: &str) -> Self {
        console_error_panic_hook::set_once();
        let transport = FetchTransport::new(api_base);
        Self {
            api: ApiClient::new(transport.clone()),
            queries: QueryOrchestrator::new(ApiClient::new(transport.clone())),
            batches: BatchOrchestrator::new(ApiClient::new(transport)),
            store: RefCell::new(SelectionStore::new()),
            prefs: RefCell::new(storage::load_preferences()),
            last_result: RefCell::new(None),
            last_batch: RefCell::new(None),
        }
    }

    // ----- selection -----

    pub fn toggle_selection(&self, category: &str, filename: &str) -> Result<(), JsValue> {
        let category = category_arg(category)?;
        self.store.borrow_mut().toggle(category, filename);
        Ok(())
    }

    pub fn select_all(&self, category: &str, checked: bool) -> Result<(), JsValue> {
        let category = category_arg(category)?;
        self.store.borrow_mut().select_all(category, checked);
        Ok(())
    }

    pub fn is_selected(&self, category: &str, filename: &str) -> Result<bool, JsValue> {
        let category = category_arg(category)?;
        Ok(self.store.borrow().is_selected(category, filename))
    }

    pub fn selected_count(&self, category: &str) -> Result<usize, JsValue> {
        let category = category_arg(category)?;
        Ok(self.store.borrow().selected_count(category))
    }

    /// Select-all checkbox state as `{ checked, indeterminate }`
    pub fn selection_status(&self, category: &str) -> Result<JsValue, JsValue> {
        let category = category_arg(category)?;
        let status = self.store.borrow().status(category);
        let result = js_sys::Object::new();
        js_sys::Reflect::set(&result, &"checked".into(), &status.checked.into())?;
        js_sys::Reflect::set(
            &result,
            &"indeterminate".into(),
            &status.indeterminate.into(),
        )?;
        Ok(result.into())
    }

    // ----- listings -----

    /// Refresh both listings from the backend. Selections for documents
    /// that no longer exist are pruned.
    pub async fn refresh_documents(&self) -> Result<JsValue, JsValue> {
        let documents = self
            .api
            .list_documents()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let regulatory = self
            .api
            .list_regulatory()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        {
            let mut store = self.store.borrow_mut();
            store.set_listing(
                Category::Documents,
                documents.iter().map(|d| d.filename.clone()),
            );
            store.set_listing(
                Category::Regulatory,
                regulatory.iter().map(|d| d.filename.clone()),
            );
        }

        to_js(&serde_json::json!({
            "documents": documents,
            "maharera": regulatory,
        }))
    }

    /// Delete one user document on the backend, then drop it from the
    /// listing and the selection.
    pub async fn delete_document(&self, filename: &str) -> Result<(), JsValue> {
        self.api
            .delete_document(filename)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.store
            .borrow_mut()
            .remove_document(Category::Documents, filename);
        Ok(())
    }

    /// Drop every regulatory document on the backend and clear the listing
    pub async fn clear_regulatory(&self) -> Result<(), JsValue> {
        self.api
            .delete_all_regulatory()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.store
            .borrow_mut()
            .set_listing(Category::Regulatory, std::iter::empty::<String>());
        Ok(())
    }

    // ----- preferences -----

    pub fn get_preferences(&self) -> Result<JsValue, JsValue> {
        to_js(&*self.prefs.borrow())
    }

    pub fn set_preferences(&self, value: JsValue) -> Result<(), JsValue> {
        let prefs: Preferences = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        storage::save_preferences(&prefs)?;
        *self.prefs.borrow_mut() = prefs;
        Ok(())
    }

    /// Reset the backend's usage counters
    pub async fn reset_usage(&self) -> Result<(), JsValue> {
        self.api
            .reset_usage()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ----- queries -----

    pub fn is_submitting(&self) -> bool {
        self.queries.is_submitting()
    }

    /// Submit a free-text question; resolves to the report view
    pub async fn submit_query(&self, question: &str) -> Result<JsValue, JsValue> {
        // Snapshot, so UI mutations during the request cannot race the borrow
        let store = self.store.borrow().clone();
        let prefs = self.prefs.borrow().clone();
        let result = self
            .queries
            .submit(&store, question, &prefs)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let (day, _) = today();
        let view = render(&result, &day);
        *self.last_result.borrow_mut() = Some(result);
        to_js(&view)
    }

    /// Run a compliance check over the current selection
    pub async fn submit_compliance_check(&self) -> Result<JsValue, JsValue> {
        let store = self.store.borrow().clone();
        let prefs = self.prefs.borrow().clone();
        let result = self
            .queries
            .submit_compliance_check(&store, &prefs)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let (day, _) = today();
        let view = render(&result, &day);
        *self.last_result.borrow_mut() = Some(result);
        to_js(&view)
    }

    // ----- batch -----

    pub fn is_batch_running(&self) -> bool {
        self.batches.is_running()
    }

    /// Process the selected documents as a batch. `on_progress` receives
    /// `{ phase, percent }` per phase transition.
    pub async fn start_batch(
        &self,
        red_flags: bool,
        compliance: bool,
        on_progress: js_sys::Function,
    ) -> Result<JsValue, JsValue> {
        let (document_ids, regulatory_ids) = {
            let store = self.store.borrow();
            (
                store.selected(Category::Documents),
                store.selected(Category::Regulatory),
            )
        };
        let options = BatchOptions {
            red_flags,
            compliance,
        };

        let progress = |phase: BatchPhase| {
            let update = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&update, &"phase".into(), &phase_name(phase).into());
            let _ = js_sys::Reflect::set(&update, &"percent".into(), &phase.percent().into());
            let _ = on_progress.call1(&JsValue::NULL, &update);
        };

        let result = self
            .batches
            .start(&document_ids, &regulatory_ids, options, progress)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let (day, _) = today();
        let view = render_batch(&result, &day);
        *self.last_batch.borrow_mut() = Some(result);
        to_js(&view)
    }

    // ----- PDF export -----

    /// Render the last query result as PDF bytes
    pub fn export_report_pdf(&self) -> Result<Vec<u8>, JsValue> {
        let result = self.last_result.borrow();
        let result = result
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No report to export yet"))?;

        let (day, _) = today();
        let view = render(result, &day);
        let mut canvas = LopdfCanvas::new();
        PdfReportBuilder::new(&mut canvas).build(&view);
        canvas
            .finish()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Render the last batch result as PDF bytes
    pub fn export_batch_report_pdf(&self) -> Result<Vec<u8>, JsValue> {
        let batch = self.last_batch.borrow();
        let batch = batch
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No batch report to export yet"))?;

        let (day, _) = today();
        let view = render_batch(batch, &day);
        let mut canvas = LopdfCanvas::new();
        PdfReportBuilder::new(&mut canvas).build_batch(&view);
        canvas
            .finish()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Suggested download name for a single-query report
    pub fn report_filename(&self) -> String {
        let (_, date) = today();
        report_engine::report_filename(date)
    }

    /// Suggested download name for a batch report
    pub fn batch_report_filename(&self) -> String {
        let (_, date) = today();
        report_engine::batch_report_filename(date)
    }
}
