use crate::models::empty_doc;
use crate::state::NoteStore;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// One-directional adapter between the selected note's content and the
/// editing surface.
///
/// `reset` pushes a document into the surface as a one-shot content reset,
/// keyed on an epoch counter. The surface reapplies its buffer only when the
/// epoch changes, so a push is never observed as a user edit and cannot loop
/// back into a save.
#[derive(Clone, Copy)]
pub(crate) struct EditorBridge {
    doc: RwSignal<serde_json::Value>,
    epoch: RwSignal<u64>,
}

impl EditorBridge {
    pub fn new() -> Self {
        Self {
            doc: RwSignal::new(empty_doc()),
            epoch: RwSignal::new(0),
        }
    }

    pub fn reset(&self, doc: serde_json::Value) {
        self.doc.set(doc);
        self.epoch.update(|e| *e += 1);
    }

    pub fn doc(&self) -> serde_json::Value {
        self.doc.get_untracked()
    }

    /// Tracked read; the surface subscribes to this in its reset effect.
    pub fn track_epoch(&self) {
        let _ = self.epoch.get();
    }

    #[cfg(test)]
    pub fn epoch_untracked(&self) -> u64 {
        self.epoch.get_untracked()
    }
}

impl Default for EditorBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten the document into the plain-text editing buffer: one line per
/// top-level block, concatenating the text of its inline nodes.
pub(crate) fn doc_to_text(doc: &serde_json::Value) -> String {
    let Some(blocks) = doc.get("content").and_then(|c| c.as_array()) else {
        return String::new();
    };

    blocks
        .iter()
        .map(|block| {
            block
                .get("content")
                .and_then(|c| c.as_array())
                .map(|inlines| {
                    inlines
                        .iter()
                        .filter_map(|i| i.get("text").and_then(|t| t.as_str()))
                        .collect::<String>()
                })
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rebuild a document from the buffer. Empty lines become empty paragraphs,
/// matching the shape a rich-text editor emits for plain text.
pub(crate) fn text_to_doc(text: &str) -> serde_json::Value {
    if text.is_empty() {
        return empty_doc();
    }

    let paragraphs: Vec<serde_json::Value> = text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                serde_json::json!({ "type": "paragraph" })
            } else {
                serde_json::json!({
                    "type": "paragraph",
                    "content": [{ "type": "text", "text": line }],
                })
            }
        })
        .collect();

    serde_json::json!({ "type": "doc", "content": paragraphs })
}

/// The bundled editing surface: a deliberately thin paragraph editor over a
/// textarea. The store never depends on this shape; it forwards whatever
/// document the surface hands it.
#[component]
pub fn EditorPane() -> impl IntoView {
    let store = expect_context::<NoteStore>();
    let bridge = expect_context::<EditorBridge>();
    let area_ref: NodeRef<html::Textarea> = NodeRef::new();

    // Apply pushed content directly to the DOM, outside the input event
    // path. Re-runs when the element mounts or the bridge epoch moves.
    Effect::new(move |_| {
        bridge.track_epoch();
        let text = doc_to_text(&bridge.doc());
        if let Some(area) = area_ref.get() {
            area.set_value(&text);
        }
    });

    let on_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(area) = target.dyn_ref::<web_sys::HtmlTextAreaElement>() {
                store.update_content(text_to_doc(&area.value()));
            }
        }
    };

    view! {
        <textarea
            class="h-full w-full resize-none bg-transparent px-6 py-4 text-sm leading-6 outline-none"
            placeholder="Start writing..."
            node_ref=area_ref
            on:input=on_input
        ></textarea>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_is_the_empty_document() {
        assert_eq!(text_to_doc(""), empty_doc());
    }

    #[test]
    fn test_doc_to_text_flattens_paragraphs() {
        let doc = serde_json::json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "first "},
                    {"type": "text", "text": "line"}
                ]},
                {"type": "paragraph"},
                {"type": "paragraph", "content": [{"type": "text", "text": "last"}]}
            ]
        });
        assert_eq!(doc_to_text(&doc), "first line\n\nlast");
    }

    #[test]
    fn test_doc_to_text_tolerates_foreign_shapes() {
        assert_eq!(doc_to_text(&serde_json::json!(null)), "");
        assert_eq!(doc_to_text(&serde_json::json!({"content": "nope"})), "");
    }

    #[test]
    fn test_text_doc_round_trip() {
        let text = "alpha\n\nbeta";
        assert_eq!(doc_to_text(&text_to_doc(text)), text);
    }

    #[test]
    fn test_empty_doc_flattens_to_empty_buffer() {
        assert_eq!(doc_to_text(&empty_doc()), "");
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_reset_bumps_epoch_and_swaps_doc() {
        let bridge = EditorBridge::new();
        let before = bridge.epoch_untracked();

        let doc = text_to_doc("pushed");
        bridge.reset(doc.clone());

        assert_eq!(bridge.epoch_untracked(), before + 1);
        assert_eq!(bridge.doc(), doc);
    }
}
