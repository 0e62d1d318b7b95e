//! Assembly of the message list sent to the completion service for one turn.

use crate::models::{Message, MessageRole};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. \
                                 If document content is provided, use it when relevant.";

/// Wraps the user's question together with the loaded document text.
fn document_prompt(document_text: &str, user_input: &str) -> String {
    format!(
        "You have access to the following document content.\n\
         Use it only when relevant.\n\
         \n\
         DOCUMENT CONTENT:\n\
         {document_text}\n\
         \n\
         USER MESSAGE:\n\
         {user_input}\n"
    )
}

/// Ephemeral request for one turn: a system message, a trailing window of the
/// transcript, and exactly one final user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRequest {
    messages: Vec<Message>,
}

impl ConversationRequest {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    /// Everything between the system message and the final user message.
    pub fn history(&self) -> &[Message] {
        &self.messages[1..self.messages.len() - 1]
    }

    pub fn final_user(&self) -> &Message {
        &self.messages[self.messages.len() - 1]
    }
}

/// Builds the request for one turn.
///
/// `transcript` must be the transcript as it stood before this turn: the new
/// input is always added as the final message, so passing a transcript that
/// already ends with it sends it twice. The document text is embedded as-is;
/// it was bounded when the document was loaded.
pub fn build_conversation(
    system_prompt: &str,
    document_text: &str,
    transcript: &[Message],
    user_input: &str,
    max_history: usize,
) -> ConversationRequest {
    let window_start = transcript.len().saturating_sub(max_history);

    let mut messages = Vec::with_capacity(transcript.len() - window_start + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(transcript[window_start..].iter().cloned());

    let final_content = if document_text.is_empty() {
        user_input.to_string()
    } else {
        document_prompt(document_text, user_input)
    };
    messages.push(Message::new(MessageRole::User, final_content));

    ConversationRequest { messages }
}
