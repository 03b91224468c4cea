use wasm_bindgen::JsValue;

/// Locale date for the sidebar meta line. Timestamps arrive from the backend
/// as ISO-8601 strings; anything the Date parser rejects is shown as-is.
pub(crate) fn format_date(iso: &str) -> String {
    if iso.trim().is_empty() {
        return String::new();
    }

    let d = js_sys::Date::new(&JsValue::from_str(iso));
    if d.get_time().is_nan() {
        return iso.to_string();
    }

    d.to_locale_date_string("default", &JsValue::UNDEFINED)
        .into()
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_format_date_parses_iso_timestamps() {
        let out = format_date("2025-01-02T03:04:05");
        assert!(!out.is_empty());
        assert_ne!(out, "2025-01-02T03:04:05");
    }

    #[wasm_bindgen_test]
    fn test_format_date_passthrough_for_garbage() {
        assert_eq!(format_date("not a date"), "not a date");
        assert_eq!(format_date("  "), "");
    }
}
