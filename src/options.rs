//! Generic options structures for transport configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::ClientError;

/// Environment variable holding the chat API base URL.
pub const BASE_URL_ENV: &str = "CHAT_API_BASE_URL";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "CHAT_API_TOKEN";

/// A secret string type for sensitive data like bearer tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Supplies the authorization token attached to outgoing requests.
///
/// Consulted once per request, so implementations may rotate or refresh
/// the token between calls. Returning `None` sends the request without an
/// `Authorization` header.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<SecretString>;
}

impl TokenProvider for SecretString {
    fn token(&self) -> Option<SecretString> {
        Some(self.clone())
    }
}

/// Generic transport options containing truly generic transport fields
/// and transport-specific configuration.
///
/// # Example
/// ```rust
/// use unai_chat::options::{HttpTransport, TransportOptions};
/// use std::time::Duration;
///
/// let options = TransportOptions::new(
///     HttpTransport::default().with_base_url("http://localhost:8000/api/chat".to_string()),
/// )
/// .with_timeout(Duration::from_secs(30));
/// assert!(options.provider.resolve_base_url().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions<T> {
    /// Request timeout. `None` means the client imposes no timeout.
    pub timeout: Option<Duration>,

    /// Transport-specific options
    pub provider: T,
}

impl<T> TransportOptions<T> {
    /// Create new transport options with transport-specific configuration.
    pub fn new(provider: T) -> Self {
        Self {
            timeout: None,
            provider,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP-specific transport options.
/// Used as the provider field in `TransportOptions<HttpTransport>`.
#[derive(Clone, Default)]
pub struct HttpTransport {
    /// Base URL for the chat endpoints, e.g. `http://localhost:8000/api/chat`
    pub base_url: Option<String>,

    /// Source of the bearer token
    pub token: Option<Arc<dyn TokenProvider>>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("proxy", &self.proxy)
            .field("extra_headers", &self.extra_headers)
            .finish()
    }
}

impl HttpTransport {
    /// Create new HTTP transport options pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Load options from the environment, reading `.env` first if present.
    ///
    /// Missing variables leave the matching field unset; an unset base URL
    /// only surfaces as an error once a request is attempted.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut transport = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            transport.base_url = Some(url);
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            transport = transport.with_token(token);
        }
        transport
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Use a fixed bearer token.
    pub fn with_token(self, token: impl Into<SecretString>) -> Self {
        self.with_token_provider(Arc::new(token.into()))
    }

    /// Use a token provider consulted on every request.
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token = Some(provider);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }

    /// Resolve the base URL, without trailing slashes.
    ///
    /// Fails with [`ClientError::Config`] when no base URL was configured.
    pub fn resolve_base_url(&self) -> Result<String, ClientError> {
        match self.base_url.as_deref().map(|url| url.trim_end_matches('/')) {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => Err(ClientError::Config(
                "API base URL is not configured".to_string(),
            )),
        }
    }

    /// Current bearer token, if any.
    pub fn current_token(&self) -> Option<SecretString> {
        self.token.as_ref().and_then(|provider| provider.token())
    }
}
