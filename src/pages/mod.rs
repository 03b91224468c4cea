use crate::components::ui::{Button, ButtonSize, ButtonVariant, Input, Spinner};
use crate::editor::EditorPane;
use crate::models::preview_text;
use crate::state::{AppContext, NoteStore};
use crate::util::format_date;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

#[component]
pub fn NotesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Handlers below run from `Fn` closures; park the store in a Copy handle.
    let store_sv = StoredValue::new(expect_context::<NoteStore>());

    let notes = app_state.0.notes;
    let selected = app_state.0.selected;
    let search_term = app_state.0.search_term;
    let loading = app_state.0.loading;
    let initialized = app_state.0.initialized;

    let search_ref: NodeRef<html::Input> = NodeRef::new();

    // Initial list load, then a reload per search keystroke (the backend
    // treats an empty query as the full list).
    Effect::new(move |_| {
        let term = search_term.get();
        store_sv.with_value(|s| s.load(&term));
    });

    // Keyboard shortcuts:
    // - Cmd/Ctrl+K: focus search
    // - Esc: blur search
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let key = ev.key().to_lowercase();

        // Don't hijack keystrokes aimed at an input; Escape still blurs.
        let in_field = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .map(|el| {
                let tag = el.tag_name().to_lowercase();
                tag == "input" || tag == "textarea"
            })
            .unwrap_or(false);
        if in_field && key != "escape" {
            return;
        }

        match key.as_str() {
            "k" if ev.meta_key() || ev.ctrl_key() => {
                ev.prevent_default();
                if let Some(input) = search_ref.get() {
                    let _ = input.focus();
                }
            }
            "escape" => {
                if let Some(input) = search_ref.get() {
                    let _ = input.blur();
                }
            }
            _ => {}
        }
    });

    let on_title_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                let value = input.value();
                store_sv.with_value(|s| s.update_title(&value));
            }
        }
    };

    view! {
        <Show
            when=move || initialized.get()
            fallback=|| view! {
                <div class="flex min-h-screen items-center justify-center gap-2 text-sm text-muted-foreground">
                    <Spinner />
                    "Loading..."
                </div>
            }
        >
            <div class="flex h-screen bg-background text-foreground">
                // Sidebar: search, create, note list.
                <div class="flex w-72 shrink-0 flex-col border-r">
                    <div class="flex flex-col gap-2 border-b p-3">
                        <Input
                            node_ref=search_ref
                            r#type="search"
                            placeholder="Search notes..."
                            bind_value=search_term
                        />
                        <Button
                            class="w-full"
                            size=ButtonSize::Sm
                            on:click=move |_| store_sv.with_value(|s| s.create_new())
                        >
                            "+ New Note"
                        </Button>
                    </div>

                    <div class="flex-1 space-y-1 overflow-y-auto p-2">
                        {move || {
                            let current_id = selected.get().and_then(|n| n.id);
                            let items = notes.get();

                            if items.is_empty() {
                                return view! {
                                    <div class="px-2 py-4 text-xs text-muted-foreground">
                                        {move || if loading.get() {
                                            "Loading notes..."
                                        } else {
                                            "No notes yet."
                                        }}
                                    </div>
                                }
                                .into_any();
                            }

                            items
                                .into_iter()
                                .map(|note| {
                                    let is_current =
                                        note.id.is_some() && note.id == current_id;
                                    let item_class = if is_current {
                                        "group cursor-pointer rounded-md border border-primary/40 bg-accent/60 px-3 py-2"
                                    } else {
                                        "group cursor-pointer rounded-md border border-transparent px-3 py-2 hover:bg-accent/30"
                                    };

                                    let preview = preview_text(&note.content);
                                    let date = format_date(&note.updated_at);
                                    let title = note.title.clone();
                                    let delete_id = note.id.clone();

                                    view! {
                                        <div
                                            class=item_class
                                            on:click=move |_| {
                                                store_sv.with_value(|s| s.select(note.clone()))
                                            }
                                        >
                                            <div class="flex items-start justify-between gap-2">
                                                <h3 class="truncate text-sm font-medium">{title}</h3>
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="opacity-0 group-hover:opacity-100"
                                                    on:click=move |ev: web_sys::MouseEvent| {
                                                        // Deleting must not also select the note.
                                                        ev.stop_propagation();
                                                        if let Some(id) = delete_id.clone() {
                                                            store_sv.with_value(|s| s.delete(id));
                                                        }
                                                    }
                                                >
                                                    "×"
                                                </Button>
                                            </div>
                                            <div class="truncate text-xs text-muted-foreground">{preview}</div>
                                            <div class="mt-1 text-[10px] text-muted-foreground">{date}</div>
                                        </div>
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }}
                    </div>
                </div>

                // Editor pane: title input + editing surface.
                <div class="flex min-w-0 flex-1 flex-col">
                    <Show
                        when=move || selected.get().is_some()
                        fallback=|| view! {
                            <div class="flex flex-1 items-center justify-center">
                                <h2 class="text-lg text-muted-foreground">
                                    "Select a note or create a new one"
                                </h2>
                            </div>
                        }
                    >
                        <input
                            class="border-b bg-transparent px-6 py-4 text-xl font-semibold outline-none placeholder:text-muted-foreground"
                            placeholder="Note title"
                            prop:value=move || {
                                selected.get().map(|n| n.title).unwrap_or_default()
                            }
                            on:input=on_title_input
                        />
                        <EditorPane />
                    </Show>
                </div>
            </div>
        </Show>
    }
}
