use leptos::prelude::*;
use web_sys::{Event, HtmlInputElement};

use crate::state::AppState;

/// Sidebar with the document upload, the loaded document and "New Chat".
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let on_file = move |ev: Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            state.upload_document(file);
        }
        // Reset so picking the same file again still fires `change`.
        input.set_value("");
    };

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"📄 Document"</h2>
                <button class="new-chat-btn" on:click=move |_| state.new_chat()>
                    "+ New Chat"
                </button>
            </div>
            <label class="upload">
                <span>{move || if state.is_uploading.get() { "Reading…" } else { "Upload PDF, TXT or MD" }}</span>
                <input
                    type="file"
                    accept=".pdf,.txt,.md,.markdown"
                    on:change=on_file
                    disabled=move || state.is_uploading.get() || state.session_id.get().is_none()
                />
            </label>
            {move || {
                state.notice.get().map(|notice| view! { <div class="notice">{notice}</div> })
            }}
            {move || {
                state.document.get().map(|doc| {
                    view! {
                        <div class="loaded-document">
                            <strong>"Loaded: "</strong>
                            {doc.name}
                            <div class="document-meta">{format!("{} characters", doc.chars)}</div>
                            <button class="remove-btn" on:click=move |_| state.remove_document()>
                                "🗑 Remove document"
                            </button>
                        </div>
                    }
                })
            }}
        </aside>
    }
}
