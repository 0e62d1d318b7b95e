use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::CompletionBackend;
use crate::conversation::{build_conversation, SYSTEM_PROMPT};
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::models::{ChatRequest, ChatResponse, DocumentContext, DocumentView, Message, SessionView};
use crate::session::SessionStore;

const MAX_MESSAGE_LENGTH: usize = 8000;

/// Per-turn tuning, taken from the startup config.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub max_history: usize,
    pub document_char_limit: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_history: 6,
            document_char_limit: 6000,
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    sessions: SessionStore,
    agent: Arc<dyn CompletionBackend>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(sessions: SessionStore, agent: Arc<dyn CompletionBackend>, settings: ChatSettings) -> Self {
        Self { sessions, agent, settings }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn create_session(&self) -> SessionView {
        let handle = self.sessions.create().await;
        let session = handle.lock().await;
        session.view()
    }

    pub async fn get_session(&self, session_id: Uuid) -> Result<SessionView, AppError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();
        Ok(session.view())
    }

    /// Extracts `bytes` and, if any text came out, replaces the session's
    /// document. On any failure the previous document stays loaded.
    pub async fn load_document(
        &self,
        session_id: Uuid,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<DocumentView, AppError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();

        let name = filename.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &name))
            .await
            .map_err(|e| AppError::Unexpected(format!("Extraction task failed: {e}")))?
            .map_err(|e| {
                warn!("Failed to extract '{filename}' for session {session_id}: {e}");
                AppError::from_document(filename.clone(), e)
            })?;

        // Checked after truncation: a loaded document always has text to wrap.
        let document = DocumentContext::new(filename, &text, self.settings.document_char_limit);
        if document.content().trim().is_empty() {
            return Err(AppError::NoReadableText { name: document.name().to_string() });
        }

        info!(
            "Session {session_id} loaded '{}' ({} of {} chars kept)",
            document.name(),
            document.char_count(),
            text.chars().count()
        );
        let view = DocumentView::from(&document);
        session.replace_document(document);
        Ok(view)
    }

    pub async fn remove_document(&self, session_id: Uuid) -> Result<SessionView, AppError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();
        session.clear_document();
        Ok(session.view())
    }

    pub async fn reset_transcript(&self, session_id: Uuid) -> Result<SessionView, AppError> {
        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();
        session.clear_transcript();
        Ok(session.view())
    }

    /// Runs one turn. The session stays locked for the whole call so turns in
    /// one session never interleave. The user message and the reply are
    /// appended together, and only once the reply has arrived.
    pub async fn chat(&self, session_id: Uuid, request: ChatRequest) -> Result<ChatResponse, AppError> {
        // ── Validation ────────────────────────────────────────────────────────
        if request.message.trim().is_empty() {
            return Err(AppError::EmptyField { field_name: "message".to_string() });
        }
        let length = request.message.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(AppError::FieldTooLong {
                field_name: "message".to_string(),
                max_length: MAX_MESSAGE_LENGTH,
                actual_length: length,
            });
        }

        let handle = self.sessions.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();

        // ── Build from the transcript as it stood before this turn ────────────
        let document_text = session.document().map(DocumentContext::content).unwrap_or_default();
        let conversation = build_conversation(
            &self.settings.system_prompt,
            document_text,
            session.transcript(),
            &request.message,
            self.settings.max_history,
        );

        let reply = self.agent.complete(&conversation).await?;

        let assistant_message = Message::assistant(reply);
        session.append(Message::user(request.message));
        session.append(assistant_message.clone());

        Ok(ChatResponse { session_id, message: assistant_message })
    }
}
