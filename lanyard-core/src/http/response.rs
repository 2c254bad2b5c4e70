//! Response Composer
//!
//! Maps a raw transport outcome (status, data, error) into the uniform
//! Success/Failure response value shared by every call surface. A response
//! is Success if and only if its status code falls in [200, 300); every
//! other path, including transport failures that never produced an HTTP
//! response, composes a Failure with a concrete [`ErrorKind`].

use serde::de::DeserializeOwned;

use crate::error::ErrorKind;
use crate::http::transport::{RawOutcome, TransportFailure};

/// Sentinel status for a transport-level timeout (no HTTP response).
pub const STATUS_TIMEOUT: i32 = -1001;
/// Sentinel status for a client-cancelled request (no HTTP response).
pub const STATUS_CANCELLED: i32 = -999;
/// Sentinel status for any other transport-level failure.
pub const STATUS_TRANSPORT_FAILURE: i32 = -1;

/// Terminal result of one logical call.
#[derive(Debug, Clone)]
pub enum Response {
    Success {
        status_code: i32,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    },
    Failure {
        status_code: i32,
        error: ErrorKind,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    },
}

impl Response {
    /// Composes a response from an HTTP status line and payload.
    pub fn compose(status: u16, headers: Vec<(String, String)>, body: Option<Vec<u8>>) -> Self {
        let status_code = i32::from(status);
        if (200..300).contains(&status_code) {
            Response::Success {
                status_code,
                headers,
                body,
            }
        } else {
            Response::Failure {
                status_code,
                error: ErrorKind::ServerError,
                headers,
                body,
            }
        }
    }

    /// Composes a Failure for a transport fault that produced no HTTP response.
    pub fn from_transport_failure(failure: &TransportFailure) -> Self {
        let (status_code, error) = match failure {
            TransportFailure::Timeout => (STATUS_TIMEOUT, ErrorKind::Timeout),
            TransportFailure::Cancelled => (STATUS_CANCELLED, ErrorKind::Cancelled),
            TransportFailure::Connection(message) => (
                STATUS_TRANSPORT_FAILURE,
                ErrorKind::Generic(message.clone()),
            ),
        };
        Response::Failure {
            status_code,
            error,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Composes from any raw transport outcome.
    pub fn from_outcome(outcome: RawOutcome) -> Self {
        match outcome {
            RawOutcome::Response {
                status,
                headers,
                body,
            } => Response::compose(status, headers, Some(body)),
            RawOutcome::Failed(failure) => Response::from_transport_failure(&failure),
        }
    }

    /// Composes a Failure for a call that never reached the transport.
    pub fn from_error(error: ErrorKind) -> Self {
        Response::Failure {
            status_code: STATUS_TRANSPORT_FAILURE,
            error,
            headers: Vec::new(),
            body: None,
        }
    }

    /// True for statuses in [200, 300).
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn status_code(&self) -> i32 {
        match self {
            Response::Success { status_code, .. } | Response::Failure { status_code, .. } => {
                *status_code
            }
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        match self {
            Response::Success { headers, .. } | Response::Failure { headers, .. } => headers,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Response::Success { body, .. } | Response::Failure { body, .. } => body.as_deref(),
        }
    }

    /// The failure classification, if any.
    pub fn error(&self) -> Option<&ErrorKind> {
        match self {
            Response::Success { .. } => None,
            Response::Failure { error, .. } => Some(error),
        }
    }

    /// Decodes the body as JSON.
    ///
    /// An absent body maps to [`ErrorKind::NoData`], a decode failure to
    /// [`ErrorKind::ParseError`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ErrorKind> {
        let body = self.body().ok_or(ErrorKind::NoData)?;
        serde_json::from_slice(body).map_err(|_| ErrorKind::ParseError)
    }
}
