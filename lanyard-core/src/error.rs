//! Error Types
//!
//! Failure taxonomy shared by the HTTP executor and the WebSocket session
//! manager. `ErrorKind` is the uniform, caller-facing classification carried
//! by `Response::Failure`; `SessionError` covers WebSocket transport faults
//! surfaced through the session observer; `ClientError` covers client
//! construction failures (TLS setup, HTTP client build).

use thiserror::Error;

/// Caller-facing failure classification for HTTP responses.
///
/// Every failed call produces exactly one of these; transport errors with no
/// HTTP response are mapped here too, so callers never see a bare absence of
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Invalid URL")]
    BadUrl,

    #[error("Request timed out")]
    Timeout,

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Server returned an error status")]
    ServerError,

    #[error("Malformed response")]
    BadResponse,

    #[error("Response carried no data")]
    NoData,

    #[error("Failed to parse response body")]
    ParseError,

    #[error("Bad request")]
    BadRequest,

    #[error("Parameter encoding failed")]
    EncodingFail,

    #[error("Required parameters were missing")]
    ParametersNil,

    #[error("Copy failed")]
    CopyError,

    #[error("{0}")]
    Generic(String),
}

/// WebSocket session transport errors, reported opaquely via
/// [`SessionObserver::on_error`](crate::ws::SessionObserver::on_error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Connection closed by peer")]
    Closed {
        code: Option<u16>,
        reason: Option<String>,
    },

    #[error("Not connected")]
    NotConnected,
}

/// Errors raised while constructing a client (TLS config, HTTP pool).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("TLS configuration failed: {0}")]
    Tls(String),

    #[error("HTTP client construction failed: {0}")]
    Http(String),
}
