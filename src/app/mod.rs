use crate::editor::EditorBridge;
use crate::pages::NotesPage;
use crate::state::{AppContext, AppState, NoteStore};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let app_state = AppState::new();
    let bridge = EditorBridge::new();
    let store = NoteStore::new(AppContext(app_state.clone()), bridge);

    provide_context(AppContext(app_state));
    provide_context(bridge);
    provide_context(store);

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=NotesPage />
            </Routes>
        </Router>
    }
}
