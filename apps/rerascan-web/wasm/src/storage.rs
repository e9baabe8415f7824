//! Preference persistence in localStorage.
//!
//! One JSON record under a fixed key. Anything unreadable (no storage,
//! corrupt JSON, missing fields) falls back to the defaults rather than
//! surfacing an error, so preferences can never block the app.

use shared_types::Preferences;
use wasm_bindgen::prelude::*;

const PREFS_KEY: &str = "rerascan_preferences";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Load preferences, falling back to defaults on any failure
pub fn load_preferences() -> Preferences {
    local_storage()
        .and_then(|storage| storage.get_item(PREFS_KEY).ok().flatten())
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Persist preferences as one JSON record
pub fn save_preferences(prefs: &Preferences) -> Result<(), JsValue> {
    let storage = local_storage().ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;
    let json =
        serde_json::to_string(prefs).map_err(|e| JsValue::from_str(&e.to_string()))?;
    storage.set_item(PREFS_KEY, &json)
}

/// Drop the stored record, returning the next load to defaults
pub fn clear_preferences() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(PREFS_KEY);
    }
}

// Browser-run tests: localStorage needs a real window
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn preferences_round_trip_through_local_storage() {
        clear_preferences();
        assert_eq!(load_preferences(), Preferences::default());

        let mut prefs = Preferences::default();
        prefs.top_k = 7;
        prefs.show_sources = false;
        save_preferences(&prefs).unwrap();
        assert_eq!(load_preferences(), prefs);

        clear_preferences();
        assert_eq!(load_preferences(), Preferences::default());
    }

    #[wasm_bindgen_test]
    fn corrupt_record_falls_back_to_defaults() {
        if let Some(storage) = local_storage() {
            storage.set_item(PREFS_KEY, "not json").unwrap();
        }
        assert_eq!(load_preferences(), Preferences::default());
        clear_preferences();
    }
}
