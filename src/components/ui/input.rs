use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Text input wired to an `RwSignal<String>`.
///
/// Binding is manual (`prop:value` + `on:input`) rather than `bind:value`;
/// the macro form has shifted between Leptos releases and this wiring is
/// stable on wasm32.
#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into)] bind_value: RwSignal<String>,
    #[prop(optional)] node_ref: NodeRef<html::Input>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "placeholder:text-muted-foreground border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-sm shadow-xs outline-none",
        "transition-[color,box-shadow] disabled:pointer-events-none disabled:opacity-50",
        "focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2",
        class
    );

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            prop:value=move || bind_value.get()
            on:input=move |ev: web_sys::Event| {
                let value = ev
                    .target()
                    .and_then(|t| t.dyn_ref::<web_sys::HtmlInputElement>().map(|i| i.value()));
                if let Some(value) = value {
                    bind_value.set(value);
                }
            }
            node_ref=node_ref
        />
    }
    .into_any()
}
