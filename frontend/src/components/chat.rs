use leptos::ev;
use leptos::prelude::*;

use crate::components::typing::TypingIndicator;
use crate::state::{has_user_message, AppState};

/// CSS class of a bubble for a message role.
pub fn bubble_class(role: &str) -> &'static str {
    if role == "user" { "user-bubble" } else { "bot-bubble" }
}

/// Main chat area with message history, typing indicator, and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            // Error banner
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner" on:click=move |_| state.dismiss_error()>{err}</div>
                    }
                })
            }}

            <Show when=move || !has_user_message(&state.messages.get())>
                <div class="header-card">
                    <h1>"🤖 Your Assistant"</h1>
                    <p>
                        "Upload a document and ask questions. "
                        "Answers are based on the document and general knowledge."
                    </p>
                </div>
            </Show>

            // Document badge
            {move || {
                state.document.get().map(|doc| {
                    view! { <div class="file-badge">"📎 " {doc.name}</div> }
                })
            }}

            // Messages
            <div class="chat-container">
                <For
                    each=move || state.messages.get()
                    key=|m| m.id.clone()
                    let:msg
                >
                    <MessageBubble role=msg.role.clone() content=msg.content.clone() />
                </For>
                <Show when=move || state.is_waiting.get()>
                    <TypingIndicator />
                </Show>
            </div>

            // Input area
            <ChatInput />
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(role: String, content: String) -> impl IntoView {
    view! { <div class=bubble_class(&role)>{content}</div> }
}

/// Chat input with textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.is_waiting.get();

    let send = move || {
        let text = input.get().trim().to_string();
        if text.is_empty() || is_sending() {
            return;
        }
        set_input.set(String::new());
        state.send_message(text);
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type your message and press Enter"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    class="send-btn"
                    on:click=move |_| send()
                    disabled=move || is_sending() || input.get().trim().is_empty()
                >
                    {move || if is_sending() { "Sending…" } else { "Send" }}
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubbles_are_keyed_by_role() {
        assert_eq!(bubble_class("user"), "user-bubble");
        assert_eq!(bubble_class("assistant"), "bot-bubble");
        assert_eq!(bubble_class("system"), "bot-bubble");
    }
}
