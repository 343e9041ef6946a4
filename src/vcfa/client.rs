//! VCFA Client
//!
//! Main client for interacting with the VCFA control plane, combining the
//! configured endpoint and the request transport.

use super::http::{HttpTransport, Transport, TransportError};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Sub-path under which the CCI Kubernetes-style APIs are served
pub const CCI_KUBERNETES_SUBPATH: &str = "cci/kubernetes";

/// Main VCFA client
#[derive(Clone)]
pub struct VcfaClient {
    /// Endpoint as configured, e.g. `https://vcfa.example.com`
    pub endpoint: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for VcfaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcfaClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl VcfaClient {
    /// Create a new client talking HTTP to `endpoint`
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, reqwest::Error> {
        let http = HttpTransport::new(token)?;
        Ok(Self::with_transport(endpoint, Arc::new(http)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(endpoint: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Base server for the CCI APIs: `<scheme>://<host[:port]>/cci/kubernetes`.
    ///
    /// Only the scheme and authority of the endpoint are kept, so an endpoint
    /// pointing at e.g. `/tm` or `/api` still resolves to the same server.
    /// Returns `None` when the endpoint is not an absolute URL with a host.
    pub fn cci_server(&self) -> Option<String> {
        let endpoint = Url::parse(&self.endpoint).ok()?;
        let host = endpoint.host_str()?;
        let authority = match endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Some(format!(
            "{}://{}/{}",
            endpoint.scheme(),
            authority,
            CCI_KUBERNETES_SUBPATH
        ))
    }

    /// Make a GET request
    pub async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        self.transport.send(Method::GET, url, None).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &Url, body: &Value) -> Result<Value, TransportError> {
        self.transport.send(Method::POST, url, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &Url) -> Result<Value, TransportError> {
        self.transport.send(Method::DELETE, url, None).await
    }
}
