use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DocumentContext, DocumentView, Message, SessionView};

/// State for one browser tab: its transcript and the loaded document.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    transcript: Vec<Message>,
    document: Option<DocumentContext>,
    last_active: Instant,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            transcript: Vec::new(),
            document: None,
            last_active: Instant::now(),
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn document(&self) -> Option<&DocumentContext> {
        self.document.as_ref()
    }

    pub fn append(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub fn replace_document(&mut self, document: DocumentContext) {
        self.document = Some(document);
    }

    /// Name and content go together; there is no half-cleared document.
    pub fn clear_document(&mut self) {
        self.document = None;
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            created_at: self.created_at,
            messages: self.transcript.clone(),
            document: self.document.as_ref().map(DocumentView::from),
        }
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory sessions keyed by id. Each session has its own lock so a slow
/// completion call in one tab never holds up another.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(id, handle.clone());
        debug!("Created session {id}");
        handle
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound { id: id.to_string() })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for at least `max_idle`. Sessions whose lock is
    /// held are mid-interaction and always survive.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.idle_for() < max_idle,
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle session(s), {} remaining", sessions.len());
        }
        evicted
    }
}
