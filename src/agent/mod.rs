use async_trait::async_trait;
use rig::completion::Chat;
use rig::message::Message as RigMessage;
use rig::prelude::CompletionClient;
use rig::providers::groq;
use tracing::{debug, error};

use crate::config::ConfigError;
use crate::conversation::ConversationRequest;
use crate::errors::AppError;
use crate::models::{Message, MessageRole};

pub const MODEL: &str = "llama-3.1-8b-instant";
pub const TEMPERATURE: f64 = 0.6;
pub const MAX_TOKENS: u64 = 700;

/// Anything that can answer a fully-built conversation with one reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &ConversationRequest) -> Result<String, AppError>;
}

/// Converts the history window into rig messages. The system prompt travels
/// as the agent preamble, so system entries are skipped here.
fn to_rig_history(messages: &[Message]) -> Vec<RigMessage> {
    messages
        .iter()
        .filter_map(|m| match m.role {
            MessageRole::User => Some(RigMessage::user(&m.content)),
            MessageRole::Assistant => Some(RigMessage::assistant(&m.content)),
            MessageRole::System => None,
        })
        .collect()
}

/// Chat completion through Groq's OpenAI-compatible endpoint.
/// A fresh agent is built per turn; nothing is cached between calls.
#[derive(Clone)]
pub struct GroqAgentService {
    client: groq::Client,
    base_url: String,
    model: String,
}

impl GroqAgentService {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, ConfigError> {
        let client = groq::Client::builder()
            .api_key(api_key)
            .base_url(base_url)
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "GROQ_API_BASE_URL",
                value: format!("{base_url} ({e})"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: MODEL.to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for GroqAgentService {
    async fn complete(&self, request: &ConversationRequest) -> Result<String, AppError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&request.system().content)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();

        let rig_history = to_rig_history(request.history());
        debug!(
            "Sending {} message(s), {} from history, to {} ({})",
            request.messages().len(),
            rig_history.len(),
            self.model,
            self.base_url
        );

        agent
            .chat(request.final_user().content.as_str(), rig_history)
            .await
            .map_err(|e| {
                error!("Completion request to {} failed: {e}", self.base_url);
                let msg = e.to_string();
                if msg.contains("Connection refused") || msg.contains("connect") || msg.contains("dns") {
                    AppError::CompletionUnavailable { host: self.base_url.clone() }
                } else {
                    AppError::CompletionFailed { message: msg }
                }
            })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays scripted replies and records every request it receives.
    #[derive(Default)]
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, AppError>>>,
        requests: Mutex<Vec<ConversationRequest>>,
    }

    impl ScriptedBackend {
        pub fn replying(replies: impl IntoIterator<Item = Result<String, AppError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                requests: Mutex::default(),
            }
        }

        pub fn requests(&self) -> Vec<ConversationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: &ConversationRequest) -> Result<String, AppError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Unexpected("no scripted reply left".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_skips_system_messages() {
        let history = vec![
            Message::system("ignored"),
            Message::user("question"),
            Message::assistant("answer"),
        ];
        assert_eq!(to_rig_history(&history).len(), 2);
    }

    #[test]
    fn client_builds_with_custom_base_url() {
        let service = GroqAgentService::new("gsk_test", "http://localhost:9999/openai/v1").unwrap();
        assert_eq!(service.model, MODEL);
        assert_eq!(service.base_url, "http://localhost:9999/openai/v1");
    }
}
