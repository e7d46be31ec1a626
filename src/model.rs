//! Data models for chat requests, sessions and streamed chunks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::StreamId;

/// Message posted by the user.
///
/// Serialized verbatim as the request body. Fields owned by the server
/// (such as the message id) are not part of it; anything else the server
/// accepts goes into `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    pub sender: String,
    /// ISO-8601 timestamp
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutboundMessage {
    /// A user-authored message with the given timestamp.
    pub fn user(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: "user".to_string(),
            timestamp: timestamp.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field to the payload.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// One delivery to the chunk callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub is_last_chunk: bool,
    pub stream_id: StreamId,
}

impl Chunk {
    /// The terminal signal: empty text, `is_last_chunk` set.
    pub fn terminal(stream_id: StreamId) -> Self {
        Self {
            text: String::new(),
            is_last_chunk: true,
            stream_id,
        }
    }
}

/// A conversation between a user and an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub agent_id: String,
    pub created_at: String,
}

/// Payload for starting a new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub user_id: String,
    pub agent_id: String,
}

/// A stored message of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: String,
    pub timestamp: String,
}
