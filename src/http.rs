//! HTTP client utilities and the reqwest-backed transport.
//!
//! This module provides client construction and request building shared
//! by every endpoint, plus [`ReqwestTransport`], the production
//! [`Transport`].

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::collections::HashMap;
use tracing::debug;

use crate::client::{ClientError, Transport, TransportRequest, TransportResponse};
use crate::options::{HttpTransport, TransportOptions};
use crate::stream::{BodySource, ByteSource};

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&transport_options)?;
/// ```
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
///
/// # Example
/// ```ignore
/// let mut req = client.post(url);
/// req = add_extra_headers(req, &transport_options.provider.extra_headers);
/// ```
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// [`Transport`] over a shared `reqwest::Client`.
///
/// Attaches the bearer token (when the token provider has one), extra
/// headers, and a JSON content type for requests with a body.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    options: HttpTransport,
}

impl ReqwestTransport {
    pub fn new(transport_options: &TransportOptions<HttpTransport>) -> Result<Self, ClientError> {
        let client = build_http_client(transport_options)
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            options: transport_options.provider.clone(),
        })
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: Client, options: HttpTransport) -> Self {
        Self { client, options }
    }

    fn build_request(&self, request: TransportRequest) -> RequestBuilder {
        let mut req = self.client.request(request.method, &request.url);

        if let Some(token) = self.options.current_token() {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }
        req = add_extra_headers(req, &self.options.extra_headers);

        if let Some(body) = request.body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }
        req
    }
}

/// Whether a response to `method` with `status` carries a body stream.
///
/// HEAD responses and 204/205 statuses never do.
pub fn has_body(method: &Method, status: StatusCode) -> bool {
    *method != Method::HEAD
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::RESET_CONTENT
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let method = request.method.clone();
        let response = self.build_request(request).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "response received");

        let body: Option<Box<dyn ByteSource>> = if has_body(&method, status) {
            Some(Box::new(BodySource::new(Box::pin(response.bytes_stream()))))
        } else {
            None
        };
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_http_client() {
        let transport_options = TransportOptions {
            timeout: Some(Duration::from_secs(30)),
            provider: HttpTransport::new("http://localhost:8000"),
        };

        let client = build_http_client(&transport_options);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let transport_options = TransportOptions::new(
            HttpTransport::new("http://localhost:8000")
                .with_proxy("http://proxy.example.com:8080".to_string()),
        );

        let client = build_http_client(&transport_options);
        assert!(client.is_ok());
    }

    #[test]
    fn test_request_carries_auth_and_content_type() {
        let options = HttpTransport::new("http://localhost:8000")
            .with_token("secret-token")
            .with_header("X-Trace".to_string(), "abc".to_string());
        let transport = ReqwestTransport::new(&TransportOptions::new(options)).unwrap();

        let request = transport
            .build_request(TransportRequest::post_json(
                "http://localhost:8000/sessions/s1/messages",
                b"{}".to_vec(),
            ))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer secret-token");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()["X-Trace"], "abc");
    }

    #[test]
    fn test_has_body() {
        assert!(has_body(&Method::POST, StatusCode::OK));
        assert!(has_body(&Method::GET, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!has_body(&Method::POST, StatusCode::NO_CONTENT));
        assert!(!has_body(&Method::POST, StatusCode::RESET_CONTENT));
        assert!(!has_body(&Method::HEAD, StatusCode::OK));
    }

    #[test]
    fn test_get_request_has_no_content_type_or_token_when_unset() {
        let transport =
            ReqwestTransport::new(&TransportOptions::new(HttpTransport::new("http://localhost")))
                .unwrap();

        let request = transport
            .build_request(TransportRequest::get("http://localhost/sessions"))
            .build()
            .unwrap();

        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }
}
