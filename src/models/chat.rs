use chrono::Utc;
use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in the shape the completion endpoint accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: content.into(),
        }
    }
}

/// Tag carried by prompt-template messages (`system`, `human`, `ai`).
/// Unknown tags are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    System,
    Human,
    Ai,
    Other(String),
}

impl MessageKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "system" => MessageKind::System,
            "human" => MessageKind::Human,
            "ai" => MessageKind::Ai,
            other => MessageKind::Other(other.to_string()),
        }
    }

    /// Role string sent on the wire for this tag.
    pub fn wire_role(&self) -> &str {
        match self {
            MessageKind::System => "system",
            MessageKind::Human => "user",
            MessageKind::Ai => "assistant",
            MessageKind::Other(tag) => tag.as_str(),
        }
    }
}

/// Message handed to a chat client. Tagged messages come from prompt templates and
/// have their tag translated at the adapter boundary; plain messages are already
/// wire-shaped and pass through untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputMessage {
    Tagged {
        kind: MessageKind,
        content: String,
    },
    Plain(ChatMessage),
}

impl InputMessage {
    pub fn system(content: impl Into<String>) -> Self {
        InputMessage::Tagged { kind: MessageKind::System, content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        InputMessage::Tagged { kind: MessageKind::Human, content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        InputMessage::Tagged { kind: MessageKind::Ai, content: content.into() }
    }

    pub fn plain(role: impl Into<String>, content: impl Into<String>) -> Self {
        InputMessage::Plain(ChatMessage { role: role.into(), content: content.into() })
    }

    pub fn to_wire(&self) -> ChatMessage {
        match self {
            InputMessage::Tagged { kind, content } =>
                ChatMessage {
                    role: kind.wire_role().to_string(),
                    content: content.clone(),
                },
            InputMessage::Plain(message) => message.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

/// Append-only history of one chat session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    messages: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), messages: Vec::new() }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(TranscriptEntry {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        });
    }

    pub fn messages(&self) -> &[TranscriptEntry] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.messages.last()
    }
}
