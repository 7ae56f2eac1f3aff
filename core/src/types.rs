use serde::{Deserialize, Serialize};

/// Speaker role constants
pub mod roles {
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
    pub const SYSTEM: &str = "system";
}

/// One turn of a conversation, oldest-first in a history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: roles::USER.to_string(),
            content,
        }
    }

    pub fn assistant(content: String) -> Self {
        Self {
            role: roles::ASSISTANT.to_string(),
            content,
        }
    }

    pub fn system(content: String) -> Self {
        Self {
            role: roles::SYSTEM.to_string(),
            content,
        }
    }
}

/// Request body for the chat-completions endpoint
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub max_tokens: u32,
    pub stream: bool,
}

/// Non-streaming response body
#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// One decoded frame of the streaming response: `data: {json}`
#[derive(Deserialize, Debug)]
pub struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Deserialize, Debug)]
pub struct StreamChoice {
    pub delta: StreamDelta,
}

/// Delta payload carried by a stream frame. A frame announces the
/// assistant role or carries a piece of content, never both in practice.
#[derive(Deserialize, Debug, Default)]
pub struct StreamDelta {
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Accumulator for the assistant reply built up across stream frames.
/// Content only ever grows; the role is set by the first role frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

impl Default for AssistantMessage {
    fn default() -> Self {
        Self {
            role: roles::ASSISTANT.to_string(),
            content: String::new(),
        }
    }
}
