//! HTTP transport seam
//!
//! Discovery never follows HTTP redirects on its own: X-XRDS-Location hops
//! are counted by the engine against its redirect budget, so the concrete
//! transport is built with automatic redirects disabled.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by the HTTP transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The URL could not be parsed or used
    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request timed out
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS, or protocol failure
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// HTTP method used for a discovery request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

/// A response as seen by the discovery engine
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Looks up a header by case-insensitive name, returning the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The media type portion of Content-Type, lowercased, without parameters.
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type")
            .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Async trait abstracting the HTTP client used during discovery
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a single request without following redirects.
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        accept: Option<&str>,
    ) -> std::result::Result<HttpResponse, TransportError>;
}

/// Transport backed by reqwest with automatic redirects disabled
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> std::result::Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        accept: Option<&str>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Head => self.client.head(url),
        };
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TransportError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
