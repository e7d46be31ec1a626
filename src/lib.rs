//! # unai-chat - streaming chat client
//!
//! Client side of the chat API: post a message to a session and consume the
//! reply as it streams in, plus the session listing/creation endpoints.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental UTF-8 decoding across arbitrary chunk boundaries
//! - Exactly one terminal chunk per `send`, on success and on every failure
//! - Pluggable transport (reqwest by default) behind a small trait
//!
//! ## Architecture
//!
//! - **`StreamingChatClient`** (`chat`): issues the request and drives the read loop
//! - **`StreamReader`** (`stream`): pulls byte chunks from a `ByteSource` until end or error
//! - **`ChunkDecoder`** (`decoder`): holds back split multi-byte characters
//! - **`StreamSession`** (`session`): stream id and lifecycle state of one exchange
//!
//! ## Example
//! ```no_run
//! use unai_chat::{OutboundMessage, StreamId, StreamingChatClient};
//! use unai_chat::options::{HttpTransport, TransportOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new("http://localhost:8000/api/chat")
//!         .with_token("your-token");
//!     let client = StreamingChatClient::new(TransportOptions::new(transport))?;
//!
//!     let message = OutboundMessage::user("Hello!", "2024-05-01T12:00:00Z");
//!     let stream_id = client
//!         .send("session-1", &message, |text: &str, is_last: bool, _: &StreamId| {
//!             if !is_last {
//!                 print!("{}", text);
//!             }
//!         })
//!         .await?;
//!     println!("\n[{}]", stream_id);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod client;
pub mod decoder;
pub mod http;
pub mod model;
pub mod options;
pub mod session;
pub mod stream;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use chat::{ChunkSink, StreamingChatClient};
pub use client::{ClientError, Transport};
pub use model::{ChatMessage, Chunk, OutboundMessage, Session};
pub use session::StreamId;
