use crate::api::ApiClient;
use crate::models::Note;
use leptos::prelude::*;

pub(crate) mod note_store;
pub(crate) use note_store::NoteStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Notes shown in the sidebar, newest first.
    pub notes: RwSignal<Vec<Note>>,

    /// The note open in the editor pane, if any.
    pub selected: RwSignal<Option<Note>>,

    /// Sidebar search query; empty means unfiltered.
    pub search_term: RwSignal<String>,

    /// True while a list/search request is in flight.
    pub loading: RwSignal<bool>,

    /// True once the first list attempt has resolved (success or failure).
    /// The shell shows a full-page loading view until then.
    pub initialized: RwSignal<bool>,

    /// Latest failed operation, for an optional error surface. The core
    /// policy is silent degrade; nothing blocks on this.
    pub last_error: RwSignal<Option<String>>,

    /// Load guard: responses from superseded list/search requests are ignored.
    pub notes_request_id: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_client(ApiClient::from_env())
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self {
            api_client: RwSignal::new(client),
            notes: RwSignal::new(vec![]),
            selected: RwSignal::new(None),
            search_term: RwSignal::new(String::new()),
            loading: RwSignal::new(false),
            initialized: RwSignal::new(false),
            last_error: RwSignal::new(None),
            notes_request_id: RwSignal::new(0),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
