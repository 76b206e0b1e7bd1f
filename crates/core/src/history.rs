//! Conversation history - the only state the engine ever sees.
//!
//! The caller constructs the full `History` for every request and discards
//! it after the response; nothing here is persisted or mutated. Message
//! content is an explicit tagged union so history-rendering code cannot
//! silently mishandle an unexpected shape.

use serde::{Deserialize, Serialize};

use crate::schema::{CodeFile, Decision, Plan};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Message payload: plain text for users, text or a structured value
/// produced by a prior turn for the assistant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Decision { decision: Decision },
    Plan { plan: Plan },
    CodeFile { file: CodeFile },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: MessageContent::Text { text: text.into() } }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: MessageContent::Text { text: text.into() } }
    }

    pub fn assistant_decision(decision: Decision) -> Self {
        Self { role: Role::Assistant, content: MessageContent::Decision { decision } }
    }

    pub fn assistant_plan(plan: Plan) -> Self {
        Self { role: Role::Assistant, content: MessageContent::Plan { plan } }
    }

    pub fn assistant_code(file: CodeFile) -> Self {
        Self { role: Role::Assistant, content: MessageContent::CodeFile { file } }
    }
}

/// Ordered, immutable conversation snapshot supplied per invocation.
/// Later messages override earlier intent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Message>);

impl History {
    pub fn new(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    /// Render the conversation as prompt context. Structured payloads are
    /// serialized as labelled JSON so the model sees exactly what was
    /// produced on earlier turns.
    pub fn transcript(&self) -> String {
        let mut transcript = String::new();
        for message in &self.0 {
            let role = message.role.as_str();
            match &message.content {
                MessageContent::Text { text } => {
                    transcript.push_str(&format!("{role}: {text}\n"));
                }
                MessageContent::Decision { decision } => {
                    let payload = serde_json::to_string(decision).unwrap_or_default();
                    transcript.push_str(&format!("{role} [decision]: {payload}\n"));
                }
                MessageContent::Plan { plan } => {
                    let payload = serde_json::to_string(plan).unwrap_or_default();
                    transcript.push_str(&format!("{role} [plan]: {payload}\n"));
                }
                MessageContent::CodeFile { file } => {
                    let payload = serde_json::to_string(file).unwrap_or_default();
                    transcript.push_str(&format!("{role} [code_file]: {payload}\n"));
                }
            }
        }
        transcript
    }
}

impl From<Vec<Message>> for History {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}
