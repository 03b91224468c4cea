use crate::api::{ApiError, ApiResult};
use crate::debounce::Debouncer;
use crate::editor::EditorBridge;
use crate::models::{empty_doc, Note};
use crate::state::{AppContext, AppState};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Quiet window for edit autosave. Rapid keystrokes collapse into one
/// request carrying the final state.
const AUTOSAVE_MS: i32 = 1000;

/// Create vs update routing for a save.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SaveKind {
    Create,
    Update,
}

pub(crate) fn save_kind(note: &Note) -> SaveKind {
    if note.id.is_some() {
        SaveKind::Update
    } else {
        SaveKind::Create
    }
}

/// Merge a saved note into the collection: replace in place when its id is
/// already present (order preserved), otherwise insert at the front. A
/// tombstoned id means the note was deleted while this save was in flight;
/// its response is dropped so the note is not resurrected.
pub(crate) fn reconcile_saved(mut notes: Vec<Note>, saved: Note, tombstones: &Tombstones) -> Vec<Note> {
    let deleted = saved
        .id
        .as_deref()
        .map(|id| is_tombstoned(tombstones, id))
        .unwrap_or(false);
    if deleted {
        return notes;
    }

    if let Some(slot) = notes.iter_mut().find(|n| n.id == saved.id) {
        *slot = saved;
    } else {
        notes.insert(0, saved);
    }
    notes
}

pub(crate) fn remove_by_id(mut notes: Vec<Note>, id: &str) -> Vec<Note> {
    notes.retain(|n| n.id.as_deref() != Some(id));
    notes
}

type Tombstones = Arc<Mutex<HashSet<String>>>;

fn is_tombstoned(tombstones: &Tombstones, id: &str) -> bool {
    tombstones
        .lock()
        .map(|t| t.contains(id))
        .unwrap_or(false)
}

/// Owns every mutation of the note collection and the selection.
///
/// All operations run on the single browser thread; network calls are
/// spawned and reconcile their responses back through the signals here, so
/// the invariants (unique ids, single selection) hold without locking.
#[derive(Clone)]
pub(crate) struct NoteStore {
    state: AppContext,
    editor: EditorBridge,
    save_debouncer: Debouncer<Note>,

    /// Ids of notes deleted locally. A save response for a tombstoned id is
    /// dropped instead of re-inserting the note (delete/save race).
    tombstones: Tombstones,
}

impl NoteStore {
    pub fn new(state: AppContext, editor: EditorBridge) -> Self {
        let tombstones: Tombstones = Arc::new(Mutex::new(HashSet::new()));

        let d_state = state.clone();
        let d_tombstones = Arc::clone(&tombstones);
        let save_debouncer = Debouncer::new(AUTOSAVE_MS, move |note: Note| {
            spawn_save(d_state.clone(), Arc::clone(&d_tombstones), note);
        });

        Self {
            state,
            editor,
            save_debouncer,
            tombstones,
        }
    }

    /// Replace the sidebar list from the backend: full list for an empty
    /// term, search otherwise. On failure the previous list stays visible.
    pub fn load(&self, term: &str) {
        let s = self.state.0.clone();

        let req_id = s.notes_request_id.get_untracked().saturating_add(1);
        s.notes_request_id.set(req_id);
        s.loading.set(true);

        let api = s.api_client.get_untracked();
        let term = term.to_string();
        spawn_local(async move {
            let result = if term.is_empty() {
                api.list_notes().await
            } else {
                api.search_notes(&term).await
            };

            // Ignore stale responses; a newer load owns the flags now.
            if s.notes_request_id.get_untracked() != req_id {
                return;
            }

            apply_load_result(&s, result);
        });
    }

    /// Persist immediately (create or update by id presence).
    pub fn save(&self, note: Note) {
        spawn_save(self.state.clone(), Arc::clone(&self.tombstones), note);
    }

    /// Persist after the quiet window; only the last edit in a window is
    /// sent. Fire-and-forget, used for per-keystroke edits.
    pub fn save_debounced(&self, note: Note) {
        self.save_debouncer.trigger(note);
    }

    /// Create a placeholder note, persist it right away (a single discrete
    /// user action, so no debounce), then open it in the editor.
    pub fn create_new(&self) {
        let s = self.state.0.clone();
        let editor = self.editor;
        let tombstones = Arc::clone(&self.tombstones);

        spawn_local(async move {
            match persist(&s, &tombstones, Note::untitled()).await {
                Ok(saved) => {
                    editor.reset(saved.content.clone());
                    s.selected.set(Some(saved));
                }
                Err(e) => record_failure(&s, "create note", &e),
            }
        });
    }

    /// Open a note in the editor pane. No network call.
    pub fn select(&self, note: Note) {
        self.editor.reset(note.content.clone());
        self.state.0.selected.set(Some(note));
    }

    /// Remove a note once the backend confirms. No optimistic removal: on
    /// failure the note stays in the list.
    pub fn delete(&self, id: String) {
        let s = self.state.0.clone();
        let editor = self.editor;
        let tombstones = Arc::clone(&self.tombstones);

        spawn_local(async move {
            let api = s.api_client.get_untracked();
            match api.delete_note(&id).await {
                Ok(()) => {
                    if let Ok(mut t) = tombstones.lock() {
                        t.insert(id.clone());
                    }
                    apply_delete_success(&s, &editor, &id);
                }
                Err(e) => record_failure(&s, "delete note", &e),
            }
        });
    }

    /// Title keystroke: the selection reflects the edit immediately, the
    /// save is debounced.
    pub fn update_title(&self, text: &str) {
        let Some(selected) = self.state.0.selected.get_untracked() else {
            return;
        };

        let updated = selected.with_title(text);
        self.state.0.selected.set(Some(updated.clone()));
        self.save_debounced(updated);
    }

    /// Content change from the editing surface. The surface owns the
    /// in-progress document, so the selection is not rewritten per change;
    /// the debounced save carries the latest document.
    pub fn update_content(&self, doc: serde_json::Value) {
        let Some(selected) = self.state.0.selected.get_untracked() else {
            return;
        };

        self.save_debounced(selected.with_content(doc));
    }
}

fn record_failure(s: &AppState, ctx: &str, e: &ApiError) {
    warn!("{ctx} failed: {e}");
    s.last_error.set(Some(format!("{ctx} failed: {e}")));
}

/// State transition for a confirmed delete: drop the note, and if it was
/// open in the editor, clear the selection and reset the surface.
fn apply_delete_success(s: &AppState, editor: &EditorBridge, id: &str) {
    s.notes.set(remove_by_id(s.notes.get_untracked(), id));

    let was_selected = s.selected.get_untracked().and_then(|n| n.id).as_deref() == Some(id);
    if was_selected {
        s.selected.set(None);
        editor.reset(empty_doc());
    }
}

fn apply_load_result(s: &AppState, result: ApiResult<Vec<Note>>) {
    match result {
        Ok(notes) => {
            s.notes.set(notes);
            s.last_error.set(None);
        }
        // Keep the previous list; a failed refresh must not blank the
        // sidebar.
        Err(e) => record_failure(s, "load notes", &e),
    }

    s.initialized.set(true);
    s.loading.set(false);
}

fn spawn_save(state: AppContext, tombstones: Tombstones, note: Note) {
    spawn_local(async move {
        let s = state.0;
        if let Err(e) = persist(&s, &tombstones, note).await {
            // The optimistic local edit stays visible; it is the source of
            // truth until a save succeeds or a newer one supersedes it.
            record_failure(&s, "save note", &e);
        }
    });
}

async fn persist(s: &AppState, tombstones: &Tombstones, note: Note) -> ApiResult<Note> {
    let api = s.api_client.get_untracked();
    let draft = note.draft();

    let saved = match save_kind(&note) {
        SaveKind::Update => {
            let id = note.id.as_deref().unwrap_or_default();
            api.update_note(id, &draft).await?
        }
        SaveKind::Create => api.create_note(&draft).await?,
    };

    let merged = reconcile_saved(s.notes.get_untracked(), saved.clone(), tombstones);
    s.notes.set(merged);
    s.last_error.set(None);

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::models::empty_doc;

    fn note(id: &str, title: &str) -> Note {
        Note {
            id: Some(id.to_string()),
            title: title.to_string(),
            content: empty_doc(),
            tags: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn test_state() -> AppState {
        AppState::with_client(ApiClient::new("http://localhost:8000".to_string()))
    }

    fn no_tombstones() -> Tombstones {
        Arc::new(Mutex::new(HashSet::new()))
    }

    fn api_error(msg: &str) -> ApiError {
        // Shape matches what the client boundary produces for a non-2xx.
        ApiError {
            kind: crate::api::ApiErrorKind::Http,
            message: msg.to_string(),
        }
    }

    #[test]
    fn test_save_kind_by_id_presence() {
        assert_eq!(save_kind(&Note::untitled()), SaveKind::Create);
        assert_eq!(save_kind(&note("a1", "t")), SaveKind::Update);
    }

    #[test]
    fn test_reconcile_replaces_in_place_preserving_order() {
        let notes = vec![note("a", "one"), note("b", "two"), note("c", "three")];
        let merged = reconcile_saved(notes, note("b", "two, edited"), &no_tombstones());

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].title, "one");
        assert_eq!(merged[1].title, "two, edited");
        assert_eq!(merged[2].title, "three");
    }

    #[test]
    fn test_reconcile_inserts_unknown_id_at_front() {
        let notes = vec![note("a", "one")];
        let merged = reconcile_saved(notes, note("b", "new"), &no_tombstones());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id.as_deref(), Some("b"));
        assert_eq!(merged[1].id.as_deref(), Some("a"));
    }

    #[test]
    fn test_reconcile_into_empty_collection() {
        let merged = reconcile_saved(vec![], note("a", "only"), &no_tombstones());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_reconcile_drops_save_for_deleted_note() {
        // A debounced save can resolve after its note was deleted; the
        // response must not resurrect it.
        let tombstones = no_tombstones();
        tombstones.lock().unwrap().insert("b".to_string());

        let notes = vec![note("a", "one")];
        let merged = reconcile_saved(notes.clone(), note("b", "deleted meanwhile"), &tombstones);
        assert_eq!(merged, notes);

        // Untombstoned saves still land.
        let merged = reconcile_saved(notes.clone(), note("c", "alive"), &tombstones);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_remove_by_id() {
        let notes = vec![note("a", "one"), note("b", "two")];
        let left = remove_by_id(notes, "a");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id.as_deref(), Some("b"));

        // Removing an absent id is a no-op.
        let left = remove_by_id(left, "zzz");
        assert_eq!(left.len(), 1);
    }

    #[test]
    fn test_tombstoned_ids_are_flagged() {
        let tombstones: Tombstones = Arc::new(Mutex::new(HashSet::new()));
        assert!(!is_tombstoned(&tombstones, "a"));

        tombstones.lock().unwrap().insert("a".to_string());
        assert!(is_tombstoned(&tombstones, "a"));
        assert!(!is_tombstoned(&tombstones, "b"));
    }

    #[test]
    fn test_delete_of_selected_note_clears_selection_and_surface() {
        let s = test_state();
        let editor = EditorBridge::new();
        let open = note("a", "open").with_content(serde_json::json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "bye"}]}]
        }));
        s.notes.set(vec![open.clone(), note("b", "other")]);
        s.selected.set(Some(open));
        editor.reset(s.selected.get_untracked().unwrap().content);

        apply_delete_success(&s, &editor, "a");

        assert_eq!(s.notes.get_untracked().len(), 1);
        assert_eq!(s.notes.get_untracked()[0].id.as_deref(), Some("b"));
        assert!(s.selected.get_untracked().is_none());
        assert_eq!(editor.doc(), empty_doc());
    }

    #[test]
    fn test_delete_of_unselected_note_keeps_selection() {
        let s = test_state();
        let editor = EditorBridge::new();
        let open = note("a", "open");
        s.notes.set(vec![open.clone(), note("b", "other")]);
        s.selected.set(Some(open.clone()));

        let epoch_before = editor.epoch_untracked();
        apply_delete_success(&s, &editor, "b");

        assert_eq!(s.notes.get_untracked().len(), 1);
        assert_eq!(s.selected.get_untracked(), Some(open));
        // No surface reset when the deleted note wasn't open.
        assert_eq!(editor.epoch_untracked(), epoch_before);
    }

    #[test]
    fn test_load_failure_keeps_notes_and_clears_loading() {
        let s = test_state();
        s.notes.set(vec![note("a", "kept")]);
        s.loading.set(true);

        apply_load_result(&s, Err(api_error("boom")));

        assert_eq!(s.notes.get_untracked().len(), 1);
        assert_eq!(s.notes.get_untracked()[0].title, "kept");
        assert!(!s.loading.get_untracked());
        assert!(s.initialized.get_untracked());
        assert!(s.last_error.get_untracked().is_some());
    }

    #[test]
    fn test_load_success_replaces_notes_and_clears_error() {
        let s = test_state();
        s.notes.set(vec![note("a", "old")]);
        s.loading.set(true);
        s.last_error.set(Some("stale".to_string()));

        apply_load_result(&s, Ok(vec![note("b", "fresh"), note("c", "fresher")]));

        let notes = s.notes.get_untracked();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id.as_deref(), Some("b"));
        assert!(!s.loading.get_untracked());
        assert!(s.last_error.get_untracked().is_none());
    }

    #[test]
    fn test_select_sets_selection_and_resets_surface() {
        let state = AppContext(test_state());
        let editor = EditorBridge::new();
        let store = NoteStore::new(state.clone(), editor);

        let n = note("a", "picked").with_content(serde_json::json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "hi"}]}]
        }));

        let epoch_before = editor.epoch_untracked();
        store.select(n.clone());

        assert_eq!(state.0.selected.get_untracked(), Some(n.clone()));
        assert_eq!(editor.doc(), n.content);
        assert_eq!(editor.epoch_untracked(), epoch_before + 1);
    }
}
