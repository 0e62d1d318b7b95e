use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::File;

use crate::api::{self, ApiFailure};
use crate::models::{DocumentInfo, Message, SessionView};

/// How long an error or notice stays on screen.
const BANNER_MS: u32 = 6_000;

const SESSION_EXPIRED: &str = "Your session expired, so a new one was started";

/// The welcome header is shown until the user has said something.
pub fn has_user_message(messages: &[Message]) -> bool {
    messages.iter().any(|m| m.role == "user")
}

/// Shared application state, provided via Leptos context.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub session_id: ReadSignal<Option<String>>,
    pub messages: ReadSignal<Vec<Message>>,
    pub document: ReadSignal<Option<DocumentInfo>>,
    pub is_waiting: ReadSignal<bool>,
    pub is_uploading: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,
    pub notice: ReadSignal<Option<String>>,

    // --- Write signals (for mutating state) ---
    set_session_id: WriteSignal<Option<String>>,
    set_messages: WriteSignal<Vec<Message>>,
    set_document: WriteSignal<Option<DocumentInfo>>,
    set_is_waiting: WriteSignal<bool>,
    set_is_uploading: WriteSignal<bool>,
    set_error: WriteSignal<Option<String>>,
    set_notice: WriteSignal<Option<String>>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (session_id, set_session_id) = signal(None::<String>);
        let (messages, set_messages) = signal(Vec::<Message>::new());
        let (document, set_document) = signal(None::<DocumentInfo>);
        let (is_waiting, set_is_waiting) = signal(false);
        let (is_uploading, set_is_uploading) = signal(false);
        let (error, set_error) = signal(None::<String>);
        let (notice, set_notice) = signal(None::<String>);

        let state = Self {
            session_id,
            messages,
            document,
            is_waiting,
            is_uploading,
            error,
            notice,
            set_session_id,
            set_messages,
            set_document,
            set_is_waiting,
            set_is_uploading,
            set_error,
            set_notice,
        };

        provide_context(state);
        state
    }

    /// Open the session backing this tab.
    pub fn start_session(&self) {
        let state = *self;
        spawn_local(async move {
            match api::create_session().await {
                Ok(view) => state.apply(view),
                Err(e) => {
                    log::error!("Failed to create session: {e}");
                    state.show_error(e.message);
                }
            }
        });
    }

    /// Re-render everything from the server's view of the session.
    fn refresh(&self) {
        let Some(id) = self.session_id.get_untracked() else {
            return;
        };
        let state = *self;
        spawn_local(async move {
            match api::fetch_session(&id).await {
                Ok(view) => state.apply(view),
                Err(e) => {
                    log::error!("Failed to fetch session: {e}");
                    state.fail(e);
                }
            }
        });
    }

    fn apply(&self, view: SessionView) {
        self.set_session_id.set(Some(view.session_id));
        self.set_messages.set(view.messages);
        self.set_document.set(view.document);
    }

    pub fn dismiss_error(&self) {
        self.set_error.set(None);
    }

    fn show_error(&self, message: String) {
        self.set_error.set(Some(message.clone()));
        let error = self.error;
        let set_error = self.set_error;
        Timeout::new(BANNER_MS, move || {
            // A newer error may have replaced this one in the meantime.
            if error.get_untracked().as_deref() == Some(message.as_str()) {
                set_error.set(None);
            }
        })
        .forget();
    }

    /// Reports a failed call. A 404 means the server dropped this tab's
    /// session, so a fresh one is opened instead of leaving the tab stuck.
    fn fail(&self, failure: ApiFailure) {
        if failure.is_session_gone() {
            log::warn!("Session lost: {failure}");
            self.set_session_id.set(None);
            self.set_messages.set(Vec::new());
            self.set_document.set(None);
            self.show_notice(SESSION_EXPIRED.to_string());
            self.start_session();
        } else {
            self.show_error(failure.message);
        }
    }

    fn show_notice(&self, message: String) {
        self.set_notice.set(Some(message.clone()));
        let notice = self.notice;
        let set_notice = self.set_notice;
        Timeout::new(BANNER_MS, move || {
            if notice.get_untracked().as_deref() == Some(message.as_str()) {
                set_notice.set(None);
            }
        })
        .forget();
    }

    /// Send one chat turn. The user's bubble is shown right away and the
    /// typing indicator runs until the server answers; afterwards the whole
    /// view is reloaded, which also drops the bubble again if the turn failed.
    pub fn send_message(&self, text: String) {
        let Some(id) = self.session_id.get_untracked() else {
            self.show_error("No active session yet, try again in a moment".to_string());
            return;
        };
        if self.is_waiting.get_untracked() {
            return;
        }

        let pending = Message {
            id: format!("pending-{}", js_sys::Date::now() as u64),
            role: "user".to_string(),
            content: text.clone(),
        };
        self.set_messages.update(|msgs| msgs.push(pending));
        self.set_is_waiting.set(true);
        self.set_error.set(None);

        let state = *self;
        spawn_local(async move {
            match api::send_chat(&id, &text).await {
                Ok(response) => log::debug!("Reply {} received", response.message.id),
                Err(e) if e.is_session_gone() => {
                    state.set_is_waiting.set(false);
                    state.fail(e);
                    return;
                }
                Err(e) => {
                    log::error!("Chat request failed: {e}");
                    state.show_error(e.message);
                }
            }
            state.set_is_waiting.set(false);
            state.refresh();
        });
    }

    /// Upload a document, replacing the one currently loaded.
    pub fn upload_document(&self, file: File) {
        let Some(id) = self.session_id.get_untracked() else {
            return;
        };
        self.set_is_uploading.set(true);
        self.set_error.set(None);

        let state = *self;
        spawn_local(async move {
            match api::upload_document(&id, &file).await {
                Ok(doc) => {
                    state.set_document.set(Some(doc.clone()));
                    state.show_notice(format!("Loaded {} ({} characters)", doc.name, doc.chars));
                }
                Err(e) => {
                    log::warn!("Upload of {} rejected: {e}", file.name());
                    state.fail(e);
                }
            }
            state.set_is_uploading.set(false);
        });
    }

    pub fn remove_document(&self) {
        let Some(id) = self.session_id.get_untracked() else {
            return;
        };
        let state = *self;
        spawn_local(async move {
            match api::remove_document(&id).await {
                Ok(view) => state.apply(view),
                Err(e) => state.fail(e),
            }
        });
    }

    /// Clear the transcript; the loaded document stays.
    pub fn new_chat(&self) {
        let Some(id) = self.session_id.get_untracked() else {
            return;
        };
        let state = *self;
        spawn_local(async move {
            match api::reset_messages(&id).await {
                Ok(view) => state.apply(view),
                Err(e) => state.fail(e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: &str) -> Message {
        Message {
            id: role.to_string(),
            role: role.to_string(),
            content: String::new(),
        }
    }

    #[test]
    fn header_hides_once_user_has_spoken() {
        assert!(!has_user_message(&[]));
        assert!(!has_user_message(&[message("assistant")]));
        assert!(has_user_message(&[message("assistant"), message("user")]));
    }
}
