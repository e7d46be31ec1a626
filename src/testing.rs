//! Fixtures shared by the unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;

use crate::client::ClientError;
use crate::stream::ByteSource;

/// Source replaying a fixed script of chunks and failures.
#[derive(Debug, Default)]
pub(crate) struct IterSource {
    items: VecDeque<Result<Bytes, String>>,
    pulls: usize,
}

impl IterSource {
    /// Script of successful chunks followed by end-of-stream.
    pub(crate) fn ok<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Self::from_results(chunks.into_iter().map(|c| Ok(c.into())))
    }

    /// Script of successful chunks followed by a read failure.
    pub(crate) fn failing<I, T>(chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        let mut source = Self::ok(chunks);
        source.items.push_back(Err(message.into()));
        source
    }

    /// Arbitrary script; `Err(message)` entries fail the pull that reaches them.
    pub(crate) fn from_results(items: impl IntoIterator<Item = Result<Bytes, String>>) -> Self {
        Self {
            items: items.into_iter().collect(),
            pulls: 0,
        }
    }

    /// Number of `pull` calls made so far.
    pub(crate) fn pulls(&self) -> usize {
        self.pulls
    }
}

#[async_trait]
impl ByteSource for IterSource {
    async fn pull(&mut self) -> Result<Option<Bytes>, ClientError> {
        self.pulls += 1;
        match self.items.pop_front() {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(message)) => Err(ClientError::StreamRead(message.into())),
            None => Ok(None),
        }
    }
}
