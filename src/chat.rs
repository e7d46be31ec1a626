//! Streaming chat client.
//!
//! [`StreamingChatClient::send`] posts a message to a session and feeds the
//! streamed reply to a [`ChunkSink`] as it arrives:
//!
//! - zero or more `(text, false, stream_id)` deliveries, in the order the
//!   bytes were received;
//! - then exactly one terminal `("", true, stream_id)` delivery, on success
//!   and on every failure path, before `send` returns.
//!
//! The returned `Result` and the terminal delivery are independent signals;
//! both always happen once.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::client::{ClientError, Transport, TransportRequest};
use crate::http::ReqwestTransport;
use crate::model::{ChatMessage, Chunk, NewSession, Session};
use crate::options::{HttpTransport, TransportOptions};
use crate::session::{StreamId, StreamSession};
use crate::stream::{ReadEvent, StreamReader};

/// Receiver of streamed chunks.
///
/// Called synchronously from the read loop; implementations must not
/// block for long and must not panic.
pub trait ChunkSink {
    fn on_chunk(&mut self, text: &str, is_last_chunk: bool, stream_id: &StreamId);
}

impl<F> ChunkSink for F
where
    F: FnMut(&str, bool, &StreamId),
{
    fn on_chunk(&mut self, text: &str, is_last_chunk: bool, stream_id: &StreamId) {
        self(text, is_last_chunk, stream_id)
    }
}

/// Forwards chunks to another task. A dropped receiver is ignored.
impl ChunkSink for UnboundedSender<Chunk> {
    fn on_chunk(&mut self, text: &str, is_last_chunk: bool, stream_id: &StreamId) {
        let _ = self.send(Chunk {
            text: text.to_string(),
            is_last_chunk,
            stream_id: stream_id.clone(),
        });
    }
}

/// Chat client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct StreamingChatClient<T = ReqwestTransport> {
    transport: T,
    options: HttpTransport,
}

impl StreamingChatClient<ReqwestTransport> {
    /// Create a client over HTTP.
    pub fn new(transport_options: TransportOptions<HttpTransport>) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&transport_options)?;
        Ok(Self {
            transport,
            options: transport_options.provider,
        })
    }

    /// Create a client from `CHAT_API_BASE_URL` / `CHAT_API_TOKEN`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(TransportOptions::new(HttpTransport::from_env()))
    }
}

impl<T: Transport> StreamingChatClient<T> {
    /// Create a client over a custom transport rooted at `base_url`.
    ///
    /// Headers and tokens are the transport's business.
    pub fn with_transport(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            options: HttpTransport::new(base_url),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Post `message` to `session_id` and stream the reply into `on_chunk`.
    ///
    /// Resolves to the stream id once the body is fully drained. Errors:
    ///
    /// - [`ClientError::Transport`] when no response was obtained;
    /// - [`ClientError::HttpStatus`] for non-2xx responses, carrying the
    ///   body text when it could be read;
    /// - [`ClientError::EmptyBody`] for a 2xx response without a body;
    /// - [`ClientError::StreamRead`] when reading fails mid-stream (chunks
    ///   already delivered stay delivered);
    /// - [`ClientError::InvalidArgument`] / [`ClientError::Config`] /
    ///   [`ClientError::Parse`] when the request cannot be built.
    ///
    /// In every case `on_chunk` receives the terminal signal exactly once,
    /// as its last call, before this returns. Dropping the future instead
    /// abandons the stream without a terminal delivery.
    pub async fn send<M, K>(
        &self,
        session_id: &str,
        message: &M,
        mut on_chunk: K,
    ) -> Result<StreamId, ClientError>
    where
        M: Serialize + ?Sized,
        K: ChunkSink,
    {
        let mut session = StreamSession::new();
        let result = self
            .stream_into(&mut session, session_id, message, &mut on_chunk)
            .await;

        session.settle(result.is_ok());
        on_chunk.on_chunk("", true, session.id());

        result.map(|()| session.into_id())
    }

    async fn stream_into<M, K>(
        &self,
        session: &mut StreamSession,
        session_id: &str,
        message: &M,
        on_chunk: &mut K,
    ) -> Result<(), ClientError>
    where
        M: Serialize + ?Sized,
        K: ChunkSink,
    {
        require_session_id(session_id)?;
        let url = self.endpoint(&["sessions", session_id, "messages"])?;
        let body = serde_json::to_vec(message)?;

        debug!(stream_id = %session.id(), %url, "posting chat message");
        let response = self
            .transport
            .execute(TransportRequest::post_json(url, body))
            .await?;

        if !response.is_success() {
            let status = response.status;
            let err = response.into_status_error().await;
            warn!(stream_id = %session.id(), status = status.as_u16(), "chat request rejected");
            return Err(err);
        }

        let Some(body) = response.body else {
            warn!(stream_id = %session.id(), "chat response has no body");
            return Err(ClientError::EmptyBody);
        };

        session.start_streaming();
        let mut reader = StreamReader::new(body);
        while let Some(event) = reader.next_event(session.decoder_mut()).await {
            match event {
                ReadEvent::Text(text) => on_chunk.on_chunk(&text, false, session.id()),
                ReadEvent::Done => break,
                ReadEvent::Failed(e) => return Err(e),
            }
        }

        debug!(stream_id = %session.id(), chunks = reader.chunks_read(), "stream completed");
        Ok(())
    }

    /// List the sessions of a user.
    pub async fn fetch_sessions(&self, user_id: &str) -> Result<Vec<Session>, ClientError> {
        let mut url = self.endpoint(&["sessions"])?;
        url.query_pairs_mut().append_pair("userId", user_id);
        self.request_json(TransportRequest::get(url)).await
    }

    /// Load the stored messages of a session.
    pub async fn fetch_session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        require_session_id(session_id)?;
        let url = self.endpoint(&["sessions", session_id, "messages"])?;
        self.request_json(TransportRequest::get(url)).await
    }

    /// Start a new session between `user_id` and `agent_id`.
    pub async fn start_new_session(
        &self,
        user_id: &str,
        agent_id: &str,
    ) -> Result<Session, ClientError> {
        let url = self.endpoint(&["sessions"])?;
        let body = serde_json::to_vec(&NewSession {
            user_id: user_id.to_string(),
            agent_id: agent_id.to_string(),
        })?;
        self.request_json(TransportRequest::post_json(url, body)).await
    }

    async fn request_json<R: DeserializeOwned>(
        &self,
        request: TransportRequest,
    ) -> Result<R, ClientError> {
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(response.into_status_error().await);
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `<base>/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let base = self.options.resolve_base_url()?;
        let mut url = Url::parse(&base)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("base URL {} cannot have a path", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn require_session_id(session_id: &str) -> Result<(), ClientError> {
    if session_id.trim().is_empty() {
        return Err(ClientError::InvalidArgument(
            "session id must not be empty".to_string(),
        ));
    }
    Ok(())
}
