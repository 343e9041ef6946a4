//! Scripted transport for unit tests

use crate::vcfa::http::{Transport, TransportError};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Answers requests from a fixed script and records every call
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn not_found() -> TransportError {
        TransportError::NotFound {
            method: Method::GET,
            url: "https://vcfa.example.com/scripted".to_string(),
        }
    }

    pub fn server_error() -> TransportError {
        TransportError::Status {
            method: Method::GET,
            url: "https://vcfa.example.com/scripted".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Remote object in `phase`
    pub fn object(name: &str, phase: &str) -> Value {
        json!({
            "metadata": {"name": name, "namespace": "my-project"},
            "status": {"phase": phase}
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            url: url.to_string(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", method, url))
    }
}

/// Never answers; every request hangs until the caller gives up
pub(crate) struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn send(
        &self,
        _method: Method,
        _url: &Url,
        _body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        std::future::pending().await
    }
}
