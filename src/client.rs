//! Core error types and the transport trait.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::stream::ByteSource;

/// Boxed error used for causes that come from an arbitrary transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, TLS...).
    #[error(transparent)]
    Transport(BoxError),

    /// The server answered with a non-2xx status.
    #[error("HTTP error {status}: {status_text}. Body: {body}")]
    HttpStatus {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The server answered 2xx but there is no body to stream.
    #[error("Response body is null")]
    EmptyBody,

    /// Reading the body failed after the stream was opened.
    #[error(transparent)]
    StreamRead(BoxError),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ClientError::Config(e.to_string())
        } else {
            ClientError::Transport(Box::new(e))
        }
    }
}

impl ClientError {
    /// Build an [`ClientError::HttpStatus`] from a status code and body text.
    pub fn http_status(status: StatusCode, body: impl Into<String>) -> Self {
        ClientError::HttpStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.into(),
        }
    }
}

/// A request handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, already serialized.
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A response whose body has not been read yet.
pub struct TransportResponse {
    pub status: StatusCode,
    /// `None` when the response carries no readable body stream.
    pub body: Option<Box<dyn ByteSource>>,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("body", &self.body.as_ref().map(|_| ".."))
            .finish()
    }
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Drain the whole body into text, replacing invalid UTF-8.
    ///
    /// A missing body reads as the empty string.
    pub async fn text(self) -> Result<String, ClientError> {
        let Some(mut body) = self.body else {
            return Ok(String::new());
        };
        let mut buf = Vec::new();
        while let Some(bytes) = body.pull().await? {
            buf.extend_from_slice(&bytes);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Turn a non-2xx response into [`ClientError::HttpStatus`].
    ///
    /// The body is read best-effort: a failure while reading it leaves the
    /// diagnostic text empty rather than masking the status error.
    pub async fn into_status_error(self) -> ClientError {
        let status = self.status;
        let body = self.text().await.unwrap_or_default();
        ClientError::http_status(status, body)
    }
}

/// Sends requests and hands back unread responses.
///
/// The production implementation is [`crate::http::ReqwestTransport`]; tests
/// plug in scripted transports to produce responses a real server cannot
/// be made to send on demand.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single request. No retries are performed.
    ///
    /// Returns [`ClientError::Transport`] when no response was obtained.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError>;
}
