use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ChatRequest;
use crate::service::chat_service::ChatService;

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET `/health`
pub async fn health_handler(State(svc): State<ChatService>) -> impl IntoResponse {
    let sessions = svc.sessions().len().await;
    Json(json!({ "status": "ok", "sessions": sessions }))
}

/// POST `/api/sessions` — start a fresh session for a new tab
pub async fn create_session_handler(State(svc): State<ChatService>) -> Response {
    (StatusCode::CREATED, Json(svc.create_session().await)).into_response()
}

/// GET `/api/sessions/{id}` — transcript and loaded document
pub async fn get_session_handler(Path(id): Path<Uuid>, State(svc): State<ChatService>) -> Response {
    match svc.get_session(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/api/sessions/{id}/messages` — one chat turn
pub async fn chat_handler(
    Path(id): Path<Uuid>,
    State(svc): State<ChatService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(&AppError::InvalidBody { message: rejection.body_text() });
        }
    };

    match svc.chat(id, request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/api/sessions/{id}/messages` — start the conversation over
pub async fn reset_messages_handler(Path(id): Path<Uuid>, State(svc): State<ChatService>) -> Response {
    match svc.reset_transcript(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/api/sessions/{id}/document` — multipart upload, field `file`
pub async fn upload_document_handler(
    Path(id): Path<Uuid>,
    State(svc): State<ChatService>,
    mut multipart: Multipart,
) -> Response {
    let (filename, bytes) = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(e) => return error_response(&e),
    };

    match svc.load_document(id, filename, bytes).await {
        Ok(document) => Json(document).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/api/sessions/{id}/document`
pub async fn remove_document_handler(Path(id): Path<Uuid>, State(svc): State<ChatService>) -> Response {
    match svc.remove_document(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload { message: e.to_string() })?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "document".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpload { message: e.to_string() })?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(AppError::EmptyField { field_name: "file".to_string() })
}

fn status_for(err: &AppError) -> StatusCode {
    if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_document() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if err.is_completion_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else if err.is_completion() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &AppError) -> Response {
    (status_for(err), Json(json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::extract::FromRequest;
    use axum::http::{header, Request};
    use serde_json::Value;

    use super::*;
    use crate::agent::testing::ScriptedBackend;
    use crate::extract::test_pdf;
    use crate::service::chat_service::ChatSettings;
    use crate::session::SessionStore;

    fn service(replies: Vec<Result<String, AppError>>) -> ChatService {
        ChatService::new(
            SessionStore::new(),
            Arc::new(ScriptedBackend::replying(replies)),
            ChatSettings::default(),
        )
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const BOUNDARY: &str = "docchat-test-boundary";

    /// Builds a multipart body from `(field, filename, bytes)` parts.
    async fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Multipart {
        let mut body = Vec::new();
        for (field, filename, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(f) => format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{f}\"\r\n"),
                None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("PUT")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_chat_round() {
        let svc = service(vec![Ok("Hello back".to_string())]);

        let created = create_session_handler(State(svc.clone())).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let id: Uuid = body_json(created).await["session_id"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();

        let reply = chat_handler(
            Path(id),
            State(svc.clone()),
            Ok(Json(ChatRequest { message: "Hello".to_string() })),
        )
        .await;
        assert_eq!(reply.status(), StatusCode::OK);
        let body = body_json(reply).await;
        assert_eq!(body["message"]["role"], "assistant");
        assert_eq!(body["message"]["content"], "Hello back");

        let view = body_json(get_session_handler(Path(id), State(svc)).await).await;
        assert_eq!(view["messages"].as_array().unwrap().len(), 2);
        assert!(view["document"].is_null());
    }

    #[tokio::test]
    async fn transport_error_is_bad_gateway_and_not_recorded() {
        let svc = service(vec![Err(AppError::CompletionFailed { message: "rate limited".into() })]);
        let id = svc.create_session().await.session_id;

        let reply = chat_handler(
            Path(id),
            State(svc.clone()),
            Ok(Json(ChatRequest { message: "Hello".to_string() })),
        )
        .await;
        assert_eq!(reply.status(), StatusCode::BAD_GATEWAY);
        assert!(body_json(reply).await["error"].as_str().unwrap().contains("rate limited"));

        let view = body_json(get_session_handler(Path(id), State(svc)).await).await;
        assert!(view["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let svc = service(vec![]);
        let response = remove_document_handler(Path(Uuid::new_v4()), State(svc)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_session_count() {
        let svc = service(vec![]);
        svc.create_session().await;
        let body = body_json(health_handler(State(svc)).await.into_response()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 1);
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let svc = service(vec![]);
        let id = svc.create_session().await.session_id;

        let form = multipart(&[("note", None, "not a file".as_bytes())]).await;
        let response = upload_document_handler(Path(id), State(svc.clone()), form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].as_str().unwrap().contains("file"));
        assert!(svc.get_session(id).await.unwrap().document.is_none());
    }

    #[tokio::test]
    async fn upload_without_text_is_422_with_error_body() {
        let svc = service(vec![]);
        let id = svc.create_session().await.session_id;

        let pdf = test_pdf::build(&[None]);
        let form = multipart(&[("file", Some("scan.pdf"), pdf.as_slice())]).await;
        let response = upload_document_handler(Path(id), State(svc.clone()), form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"].as_str().unwrap().contains("scan.pdf"));
        assert!(svc.get_session(id).await.unwrap().document.is_none());
    }

    #[tokio::test]
    async fn text_upload_returns_document_view() {
        let svc = service(vec![]);
        let id = svc.create_session().await.session_id;

        let form = multipart(&[("file", Some("notes.txt"), "Quarterly total: 42".as_bytes())]).await;
        let response = upload_document_handler(Path(id), State(svc.clone()), form).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "notes.txt");
        assert_eq!(body["chars"], 19);

        let view = body_json(get_session_handler(Path(id), State(svc)).await).await;
        assert_eq!(view["document"]["name"], "notes.txt");
    }

    #[tokio::test]
    async fn malformed_chat_body_is_400_json() {
        let svc = service(vec![Ok("never sent".to_string())]);
        let id = svc.create_session().await.session_id;

        for raw in ["{not json", r#"{"text": "wrong field"}"#] {
            let payload = Json::<ChatRequest>::from_request(json_request(raw), &()).await;
            assert!(payload.is_err());

            let response = chat_handler(Path(id), State(svc.clone()), payload).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
        }

        let view = svc.get_session(id).await.unwrap();
        assert!(view.messages.is_empty());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_for(&AppError::NoReadableText { name: "a.pdf".into() }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&AppError::InvalidUpload { message: "eof".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::CompletionUnavailable { host: "h".into() }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&AppError::Unexpected("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
