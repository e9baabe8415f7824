//! User preferences and backend usage statistics.

use serde::{Deserialize, Serialize};

/// Client preferences, persisted as one JSON record in local storage.
/// Missing fields fall back to the fixed defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: String,
    pub top_k: u32,
    pub show_sources: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            top_k: 3,
            show_sources: true,
        }
    }
}

impl Preferences {
    /// Clamp `top_k` into the range the backend accepts (1..=10)
    pub fn effective_top_k(&self) -> u32 {
        self.top_k.clamp(1, 10)
    }
}

/// Usage counters reported by `/api/usage`, polled best-effort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub session_start: Option<String>,
}
