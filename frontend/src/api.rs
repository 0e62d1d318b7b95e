use gloo_net::http::{Request, Response};
use web_sys::{File, FormData};

use crate::models::{ApiError, ChatRequest, ChatResponse, DocumentInfo, SessionView};

/// Base URL of the backend API. Empty means same origin, which is how the
/// backend serves the built frontend.
const API_BASE: &str = match option_env!("DOCCHAT_API_BASE") {
    Some(base) => base,
    None => "",
};

fn session_url(session_id: &str, rest: &str) -> String {
    format!("{API_BASE}/api/sessions/{session_id}{rest}")
}

/// A failed API call. `status` is set when the server answered.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiFailure {
    /// The server no longer knows the session (restart or idle eviction).
    pub fn is_session_gone(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<String> for ApiFailure {
    fn from(message: String) -> Self {
        Self { status: None, message }
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Turns a non-2xx response into the backend's error text.
async fn read_error(resp: Response) -> ApiFailure {
    let status = resp.status();
    let message = match resp.json::<ApiError>().await {
        Ok(body) => body.error,
        Err(_) => format!("Server error: {status}"),
    };
    ApiFailure { status: Some(status), message }
}

async fn parse<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ApiFailure> {
    if !resp.ok() {
        return Err(read_error(resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| format!("Parse error: {e}").into())
}

/// Starts a new session; each browser tab owns exactly one.
pub async fn create_session() -> Result<SessionView, ApiFailure> {
    let resp = Request::post(&format!("{API_BASE}/api/sessions"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    parse(resp).await
}

pub async fn fetch_session(session_id: &str) -> Result<SessionView, ApiFailure> {
    let resp = Request::get(&session_url(session_id, ""))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    parse(resp).await
}

pub async fn send_chat(session_id: &str, message: &str) -> Result<ChatResponse, ApiFailure> {
    let body = ChatRequest { message: message.to_string() };

    let resp = Request::post(&session_url(session_id, "/messages"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    parse(resp).await
}

pub async fn reset_messages(session_id: &str) -> Result<SessionView, ApiFailure> {
    let resp = Request::delete(&session_url(session_id, "/messages"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    parse(resp).await
}

/// Uploads `file` as multipart field `file`, replacing any loaded document.
pub async fn upload_document(session_id: &str, file: &File) -> Result<DocumentInfo, ApiFailure> {
    let form = FormData::new().map_err(|e| format!("Form error: {e:?}"))?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(|e| format!("Form error: {e:?}"))?;

    let resp = Request::put(&session_url(session_id, "/document"))
        .body(form)
        .map_err(|e| format!("Request error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    parse(resp).await
}

pub async fn remove_document(session_id: &str) -> Result<SessionView, ApiFailure> {
    let resp = Request::delete(&session_url(session_id, "/document"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    parse(resp).await
}
