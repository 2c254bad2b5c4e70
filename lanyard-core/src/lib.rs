//! Lanyard Core Library
//!
//! Resilient network transport client: an HTTP request executor with
//! timeout-based retry, certificate pinning, multipart upload, and
//! long-polling, paired with a WebSocket session manager providing
//! heartbeat, liveness detection, and automatic reconnection. Both share a
//! single certificate-pinning validation routine and a uniform
//! Success/Failure response model.

pub mod endpoint;
pub mod error;
pub mod http;
pub mod logging;
pub mod pinning;
pub mod tls;
pub mod ws;

pub use endpoint::{CachePolicy, Endpoint, HttpMethod, ParameterEncoding};
pub use error::{ClientError, ErrorKind, SessionError};
pub use http::{
    HttpExecutor, HttpTransport, MockHttpTransport, MultipartPart, Response, RetryPolicy,
    ReqwestTransport,
};
pub use logging::{RequestLogger, RequestRecord, ResponseRecord};
pub use pinning::{validate, CertificateSet, PinnedCertificate};
pub use ws::{
    Frame, MockSocketConnector, SessionConfig, SessionObserver, SocketConnector,
    TungsteniteConnector, WebSocketManager,
};
