//! HTTP Transport
//!
//! Transport seam between the executor and the wire. The executor is handed
//! a [`HttpTransport`] at construction, so tests substitute
//! [`MockHttpTransport`](crate::http::MockHttpTransport) and production uses
//! [`ReqwestTransport`]; there is no ambient global client. Plain requests
//! and uploads are distinct logical request types so concurrent uploads do
//! not block concurrent simple requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::endpoint::HttpMethod;
use crate::error::ClientError;
use crate::http::encode::PreparedRequest;
use crate::pinning::CertificateSet;
use crate::tls;

/// Transport-level fault that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request exceeded its timeout (reserved code −1001).
    Timeout,
    /// The request was cancelled client-side (reserved code −999).
    Cancelled,
    /// Any other connection-level failure.
    Connection(String),
}

impl TransportFailure {
    /// Timeout and client cancellation are the only retryable faults.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportFailure::Timeout | TransportFailure::Cancelled)
    }
}

/// Raw result of dispatching one prepared request.
#[derive(Debug, Clone)]
pub enum RawOutcome {
    /// The transport produced an HTTP response (any status).
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// The transport failed before an HTTP response existed.
    Failed(TransportFailure),
}

/// Dispatches prepared requests over the wire.
///
/// Implementations must be safe to share across arbitrarily many in-flight
/// requests; concurrency is bounded by the underlying pool, not by this
/// trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatches a plain data request.
    async fn execute(&self, request: &PreparedRequest, timeout: Duration) -> RawOutcome;

    /// Dispatches an upload. Same wire semantics as [`execute`](Self::execute),
    /// kept separate so implementations can schedule uploads independently.
    async fn upload(&self, request: &PreparedRequest, timeout: Duration) -> RawOutcome;
}

/// Production transport over a pooled `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with optional certificate pinning.
    ///
    /// The pin set feeds the same TLS validation routine the WebSocket
    /// connector uses (see [`crate::tls`]).
    pub fn new(pins: Option<CertificateSet>) -> Result<Self, ClientError> {
        let tls_config = tls::client_config(pins)?;
        let client = reqwest::Client::builder()
            .use_preconfigured_tls(Arc::unwrap_or_clone(tls_config))
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(ReqwestTransport { client })
    }

    async fn dispatch(&self, request: &PreparedRequest, timeout: Duration) -> RawOutcome {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, request.url.clone())
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return RawOutcome::Failed(classify_error(&e)),
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        match response.bytes().await {
            Ok(body) => RawOutcome::Response {
                status,
                headers,
                body: body.to_vec(),
            },
            Err(e) => RawOutcome::Failed(classify_error(&e)),
        }
    }
}

fn classify_error(error: &reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Connection(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &PreparedRequest, timeout: Duration) -> RawOutcome {
        self.dispatch(request, timeout).await
    }

    // reqwest schedules bodies through the same pool; the distinction is kept
    // at the trait level so callers and mocks can tell the two apart.
    async fn upload(&self, request: &PreparedRequest, timeout: Duration) -> RawOutcome {
        self.dispatch(request, timeout).await
    }
}
