//! Byte-chunk sources and the read loop that drains them.
//!
//! A [`ByteSource`] is the narrow pull interface the read loop consumes:
//! each `pull` suspends until the next chunk, end-of-stream, or a read
//! failure. Closing is implicit; dropping the source releases the body.
//!
//! [`StreamReader`] drives one source through an explicit state machine:
//!
//! ```text
//! Reading --bytes--> Reading
//! Reading --end----> Done
//! Reading --error--> Failed
//! ```
//!
//! Once `Done` or `Failed` is reached the reader never pulls again.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::client::{BoxError, ClientError};
use crate::decoder::ChunkDecoder;

/// Pull interface over a response body.
#[async_trait]
pub trait ByteSource: Send {
    /// Next chunk of bytes, `Ok(None)` at end-of-stream.
    ///
    /// Read failures surface as [`ClientError::StreamRead`].
    async fn pull(&mut self) -> Result<Option<Bytes>, ClientError>;
}

/// Adapts any fallible byte stream (e.g. `reqwest::Response::bytes_stream`)
/// into a [`ByteSource`].
pub struct BodySource<S> {
    inner: S,
}

impl<S> BodySource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S, E> ByteSource for BodySource<S>
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: Into<BoxError> + Send,
{
    async fn pull(&mut self) -> Result<Option<Bytes>, ClientError> {
        match self.inner.next().await {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(e)) => Err(ClientError::StreamRead(e.into())),
            None => Ok(None),
        }
    }
}

/// Read-loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Reading,
    Done,
    Failed,
}

/// Outcome of one read-loop step.
#[derive(Debug)]
pub enum ReadEvent {
    /// Decoded text of one pulled chunk. May be empty when the chunk only
    /// carried the start of a multi-byte character.
    Text(String),
    /// End-of-stream reached.
    Done,
    /// The pull failed; the stream is over.
    Failed(ClientError),
}

/// Sequential reader over a single [`ByteSource`].
pub struct StreamReader<S: ?Sized = dyn ByteSource> {
    state: ReadState,
    chunks: usize,
    source: Box<S>,
}

impl<S: ByteSource + ?Sized> StreamReader<S> {
    pub fn new(source: Box<S>) -> Self {
        Self {
            state: ReadState::Reading,
            chunks: 0,
            source,
        }
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Number of byte chunks pulled successfully.
    pub fn chunks_read(&self) -> usize {
        self.chunks
    }

    /// Pull one chunk and advance the state machine.
    ///
    /// Returns `None` once the reader is in a final state; no further pulls
    /// are made against the source after that.
    pub async fn next_event(&mut self, decoder: &mut ChunkDecoder) -> Option<ReadEvent> {
        if self.state != ReadState::Reading {
            return None;
        }
        let pulled = self.source.pull().await;
        let (state, event) = self.transition(pulled, decoder);
        self.state = state;
        Some(event)
    }

    fn transition(
        &mut self,
        pulled: Result<Option<Bytes>, ClientError>,
        decoder: &mut ChunkDecoder,
    ) -> (ReadState, ReadEvent) {
        match pulled {
            Ok(Some(bytes)) => {
                self.chunks += 1;
                debug!(chunk = self.chunks, bytes = bytes.len(), "chunk received");
                (ReadState::Reading, ReadEvent::Text(decoder.decode(&bytes)))
            }
            Ok(None) => {
                let dropped = decoder.finish();
                if dropped > 0 {
                    warn!(bytes = dropped, "stream ended inside a multi-byte character");
                }
                (ReadState::Done, ReadEvent::Done)
            }
            Err(e) => {
                warn!(error = %e, after_chunks = self.chunks, "stream read failed");
                (ReadState::Failed, ReadEvent::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::IterSource;
    use futures::stream;

    async fn drain(reader: &mut StreamReader<IterSource>) -> Vec<ReadEvent> {
        let mut decoder = ChunkDecoder::new();
        let mut events = Vec::new();
        while let Some(event) = reader.next_event(&mut decoder).await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_reader_yields_chunks_then_done() {
        let mut reader = StreamReader::new(Box::new(IterSource::ok(["Hello", " world", "!"])));
        let events = drain(&mut reader).await;

        let texts: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ReadEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["Hello", " world", "!"]);
        assert!(matches!(events.last(), Some(ReadEvent::Done)));
        assert_eq!(reader.state(), ReadState::Done);
        assert_eq!(reader.chunks_read(), 3);
    }

    #[tokio::test]
    async fn test_reader_stops_pulling_after_failure() {
        let mut reader = StreamReader::new(Box::new(IterSource::from_results([
            Ok(Bytes::from_static(b"First chunk")),
            Err("Stream read error".to_string()),
            Ok(Bytes::from_static(b"never read")),
        ])));
        let events = drain(&mut reader).await;

        assert_eq!(events.len(), 2);
        match &events[1] {
            ReadEvent::Failed(e) => assert_eq!(e.to_string(), "Stream read error"),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(reader.state(), ReadState::Failed);
        assert_eq!(reader.source.pulls(), 2);
    }

    #[tokio::test]
    async fn test_reader_done_is_sticky() {
        let mut reader = StreamReader::new(Box::new(IterSource::ok(Vec::<Bytes>::new())));
        let mut decoder = ChunkDecoder::new();
        assert!(matches!(reader.next_event(&mut decoder).await, Some(ReadEvent::Done)));
        assert!(reader.next_event(&mut decoder).await.is_none());
        assert_eq!(reader.source.pulls(), 1);
    }

    #[tokio::test]
    async fn test_reader_keeps_split_characters_together() {
        // "é" is 0xC3 0xA9
        let mut reader = StreamReader::new(Box::new(IterSource::ok([
            b"caf\xC3".to_vec(),
            b"\xA9!".to_vec(),
        ])));
        let events = drain(&mut reader).await;
        let texts: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ReadEvent::Text(t) => Some(t.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["caf", "é!"]);
    }

    #[tokio::test]
    async fn test_body_source_maps_errors_to_stream_read() {
        let items: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer")),
        ];
        let mut source = BodySource::new(stream::iter(items));

        assert_eq!(source.pull().await.unwrap().unwrap(), Bytes::from_static(b"abc"));
        let err = source.pull().await.unwrap_err();
        assert!(matches!(err, ClientError::StreamRead(_)));
        assert_eq!(err.to_string(), "reset by peer");
        assert!(source.pull().await.unwrap().is_none());
    }
}
