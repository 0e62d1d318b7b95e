use serde::{Deserialize, Serialize};

/// Matches the backend `Message` model.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: String,
    pub content: String,
}

/// Matches the backend `DocumentView`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DocumentInfo {
    pub name: String,
    pub chars: usize,
}

/// Matches the backend `SessionView`.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub document: Option<DocumentInfo>,
}

/// Request body for a chat turn.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response from the chat endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatResponse {
    pub message: Message,
}

/// Error body returned by every failing endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiError {
    pub error: String,
}
