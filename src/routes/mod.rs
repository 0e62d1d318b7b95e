pub mod api_routes;

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::service::chat_service::ChatService;
use api_routes::{
    chat_handler, create_session_handler, get_session_handler, health_handler,
    remove_document_handler, reset_messages_handler, upload_document_handler,
};

/// JSON API plus the built frontend as a static fallback.
pub fn router(svc: ChatService, static_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/{id}", get(get_session_handler))
        .route(
            "/api/sessions/{id}/messages",
            post(chat_handler).delete(reset_messages_handler),
        )
        .route(
            "/api/sessions/{id}/document",
            put(upload_document_handler)
                .delete(remove_document_handler)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(svc)
}
