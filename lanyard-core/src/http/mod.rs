//! HTTP Layer
//!
//! Request encoding, the transport seam, the response composer, and the
//! executor that ties them together with retry, multipart upload, and
//! long-polling.
//!
//! # Architecture
//!
//! - **Request Encoder**: Endpoint → wire-ready [`PreparedRequest`]
//! - **Transport trait**: injected dispatch seam with a production reqwest
//!   implementation and a mock for testing
//! - **Response Composer**: raw outcome → uniform Success/Failure
//! - **Executor**: retry policy, callback and awaiting surfaces, long-poll
//!
//! # Example
//!
//! ```ignore
//! use lanyard_core::http::{HttpExecutor, ReqwestTransport, RetryPolicy};
//! use lanyard_core::Endpoint;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let transport = Arc::new(ReqwestTransport::new(None)?);
//! let executor = HttpExecutor::new(transport);
//!
//! let endpoint = Endpoint::new("https://api.example.com", "/items");
//! let response = executor
//!     .request(&endpoint, RetryPolicy::new(2, Duration::from_millis(500)))
//!     .await;
//! ```

mod encode;
mod executor;
mod mock;
mod response;
mod transport;

pub use encode::{prepare, prepare_multipart, MultipartPart, PreparedRequest};
pub use executor::{HttpExecutor, LongPollStop, RetryPolicy};
pub use mock::{DispatchKind, MockHttpTransport};
pub use response::{
    Response, STATUS_CANCELLED, STATUS_TIMEOUT, STATUS_TRANSPORT_FAILURE,
};
pub use transport::{HttpTransport, RawOutcome, ReqwestTransport, TransportFailure};
