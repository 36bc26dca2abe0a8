//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the single seam between the SDK and an HTTP library. The
//! controllers own one `Arc<dyn Transport>` and share it with every resource
//! sub-controller, so implementations must be `Send + Sync`. A transport only
//! reports failures to produce a response at all (DNS, TLS, connection
//! reset); every status code, including 4xx/5xx, comes back as an
//! `HttpResponse`.

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// The request never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport failed: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError::new(err.to_string())
    }
}

pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// The agent is configured with `http_status_as_error(false)` so error
/// statuses are handed back to the parse layer instead of becoming `Err`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&url);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&url);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if method == HttpMethod::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
