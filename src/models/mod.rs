use serde::{Deserialize, Serialize};

/// Placeholder title for freshly created notes.
pub(crate) const UNTITLED: &str = "Untitled Note";

/// Fallback preview when a note has no extractable text.
pub(crate) const EMPTY_PREVIEW: &str = "Empty note...";

/// A note as stored by the backend.
///
/// `content` is the rich-text document tree as produced by the editing
/// surface. We treat it as opaque JSON and pass it through verbatim; the only
/// place that peeks inside is [`preview_text`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Note {
    /// Server-assigned id. `None` only for a draft that was never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for create/update. The backend assigns ids and timestamps.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NoteDraft {
    pub title: String,
    pub content: serde_json::Value,
    pub tags: Vec<String>,
}

impl Note {
    /// Draft for a brand-new note, persisted before it enters the list.
    pub fn untitled() -> Self {
        Self {
            id: None,
            title: UNTITLED.to_string(),
            content: empty_doc(),
            tags: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn with_title(&self, title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: serde_json::Value) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    pub fn draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// The document the editing surface starts from: one empty paragraph.
pub(crate) fn empty_doc() -> serde_json::Value {
    serde_json::json!({
        "type": "doc",
        "content": [{ "type": "paragraph" }],
    })
}

/// Best-effort sidebar preview: the first text node reachable by descending
/// into the first child of the root's first child. Anything missing along the
/// way falls back to [`EMPTY_PREVIEW`].
pub(crate) fn preview_text(content: &serde_json::Value) -> String {
    content
        .get("content")
        .and_then(|c| c.get(0))
        .and_then(|block| block.get("content"))
        .and_then(|c| c.get(0))
        .and_then(|inline| inline.get("text"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(EMPTY_PREVIEW)
        .to_string()
}
