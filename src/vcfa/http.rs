//! HTTP transport for VCFA REST API calls

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("vcfa-ns/", env!("CARGO_PKG_VERSION"));

/// Bound on a single request, connect included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure of a single request against the control plane
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP 404: the addressed object does not exist
    #[error("{method} {url}: not found")]
    NotFound { method: Method, url: String },

    /// Any other non-success status
    #[error("{method} {url}: API request failed: {status}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
    },

    /// The request never produced a response
    #[error("{method} {url}: failed to send request: {source}")]
    Request {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON
    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Request-send primitive used by every CRUD operation.
///
/// Implementations decode the response body as JSON; an empty body decodes
/// to [`Value::Null`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// reqwest-backed [`Transport`] with bearer token authentication
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, token })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{} {} returned 404", method, url);
            return Err(TransportError::NotFound {
                method,
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(TransportError::Status {
                method,
                url: url.to_string(),
                status,
            });
        }

        // DELETE and some POSTs answer with no body
        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response_body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("truncated, 500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("bad\r\nrequest\t!"), "badrequest!");
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = format!("{}é{}", "a".repeat(MAX_LOG_BODY_LENGTH - 1), "b".repeat(10));
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }
}
