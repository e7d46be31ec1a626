//! Identity and lifecycle of one streaming exchange.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::decoder::ChunkDecoder;

/// Identifier correlating every chunk of one `send` call.
///
/// Always of the form `stream-<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    /// Generate a fresh, collision-resistant id.
    pub fn generate() -> Self {
        Self(format!("stream-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StreamId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StreamId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Lifecycle of a [`StreamSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Streaming,
    Completed,
    Errored,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Errored)
    }
}

/// One logical streaming exchange.
///
/// Created by `send` before any I/O and dropped when `send` returns.
#[derive(Debug)]
pub struct StreamSession {
    id: StreamId,
    state: SessionState,
    decoder: ChunkDecoder,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            id: StreamId::generate(),
            state: SessionState::Init,
            decoder: ChunkDecoder::new(),
        }
    }

    pub fn id(&self) -> &StreamId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn decoder_mut(&mut self) -> &mut ChunkDecoder {
        &mut self.decoder
    }

    /// A body stream was obtained. Only valid from `Init`.
    pub fn start_streaming(&mut self) {
        debug_assert_eq!(self.state, SessionState::Init);
        self.state = SessionState::Streaming;
        debug!(stream_id = %self.id, "stream opened");
    }

    /// Record the final outcome. Later calls are ignored.
    pub fn settle(&mut self, ok: bool) {
        if self.state.is_terminal() {
            return;
        }
        self.state = if ok {
            SessionState::Completed
        } else {
            SessionState::Errored
        };
        debug!(stream_id = %self.id, state = ?self.state, "stream settled");
    }

    pub fn into_id(self) -> StreamId {
        self.id
    }
}
