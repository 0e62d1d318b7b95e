use thiserror::Error;

use crate::extract::DocumentError;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Session errors ───────────────────────────────────────────────────────
    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    // ── Document errors ──────────────────────────────────────────────────────
    #[error("Could not read '{name}': {source}")]
    DocumentParse {
        name: String,
        #[source]
        source: DocumentError,
    },

    #[error("'{name}' is not a supported document type (expected .pdf, .txt or .md)")]
    UnsupportedDocument { name: String },

    #[error("'{name}' has no readable text")]
    NoReadableText { name: String },

    // ── Completion errors ────────────────────────────────────────────────────
    #[error("Completion service unavailable at {host}")]
    CompletionUnavailable { host: String },

    #[error("Completion failed: {message}")]
    CompletionFailed { message: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' exceeds max length of {max_length} (actual: {actual_length})")]
    FieldTooLong { field_name: String, max_length: usize, actual_length: usize },

    #[error("Invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Maps an extractor failure onto the user-facing document errors.
    pub fn from_document(name: impl Into<String>, source: DocumentError) -> Self {
        let name = name.into();
        match source {
            DocumentError::UnsupportedType(_) => AppError::UnsupportedDocument { name },
            other => AppError::DocumentParse { name, source: other },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::SessionNotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. }
                | AppError::FieldTooLong { .. }
                | AppError::InvalidUpload { .. }
                | AppError::InvalidBody { .. }
        )
    }

    pub fn is_document(&self) -> bool {
        matches!(
            self,
            AppError::DocumentParse { .. }
                | AppError::UnsupportedDocument { .. }
                | AppError::NoReadableText { .. }
        )
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, AppError::CompletionFailed { .. })
    }

    pub fn is_completion_unavailable(&self) -> bool {
        matches!(self, AppError::CompletionUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_maps_to_unsupported_document() {
        let err = AppError::from_document("notes.docx", DocumentError::UnsupportedType("docx".into()));
        assert!(matches!(err, AppError::UnsupportedDocument { ref name } if name == "notes.docx"));
        assert!(err.is_document());
    }

    #[test]
    fn parse_failure_keeps_source() {
        let err = AppError::from_document("broken.pdf", DocumentError::Pdf("bad xref".into()));
        assert!(err.is_document());
        assert!(err.to_string().contains("broken.pdf"));
        assert!(err.to_string().contains("bad xref"));
    }

    #[test]
    fn classification_is_disjoint() {
        let err = AppError::EmptyField { field_name: "message".into() };
        assert!(err.is_validation());
        assert!(!err.is_document());
        assert!(!err.is_not_found());
        assert!(AppError::InvalidBody { message: "EOF".into() }.is_validation());

        let err = AppError::CompletionUnavailable { host: "https://api.groq.com".into() };
        assert!(err.is_completion_unavailable());
        assert!(!err.is_completion());
    }
}
