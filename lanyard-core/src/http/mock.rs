//! Mock HTTP Transport
//!
//! Test double for the [`HttpTransport`] seam: scripted outcomes and a log
//! of every dispatched request.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::http::encode::PreparedRequest;
use crate::http::transport::{HttpTransport, RawOutcome, TransportFailure};

/// Which transport entry point a request went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Data,
    Upload,
}

/// Mock transport for testing.
///
/// Outcomes are served in FIFO order; once the queue is empty every request
/// gets an empty `200`. Dispatched requests are recorded for inspection.
///
/// # Example
///
/// ```ignore
/// use lanyard_core::http::{MockHttpTransport, RawOutcome, TransportFailure};
///
/// let transport = MockHttpTransport::new();
/// transport.queue_failure(TransportFailure::Timeout);
/// transport.queue_status(200, b"{}".to_vec());
/// // ... hand to an HttpExecutor, then:
/// assert_eq!(transport.request_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockHttpTransport {
    outcomes: Mutex<VecDeque<RawOutcome>>,
    requests: Mutex<Vec<(DispatchKind, PreparedRequest)>>,
}

impl MockHttpTransport {
    /// Creates a mock transport with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw outcome for the next dispatch.
    pub fn queue_outcome(&self, outcome: RawOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Queues an HTTP response with the given status and body.
    pub fn queue_status(&self, status: u16, body: Vec<u8>) {
        self.queue_outcome(RawOutcome::Response {
            status,
            headers: Vec::new(),
            body,
        });
    }

    /// Queues a transport failure.
    pub fn queue_failure(&self, failure: TransportFailure) {
        self.queue_outcome(RawOutcome::Failed(failure));
    }

    /// Number of requests dispatched so far, across both entry points.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Copies of all dispatched requests, in order.
    pub fn requests(&self) -> Vec<(DispatchKind, PreparedRequest)> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, kind: DispatchKind, request: &PreparedRequest) -> RawOutcome {
        self.requests.lock().unwrap().push((kind, request.clone()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RawOutcome::Response {
                status: 200,
                headers: Vec::new(),
                body: Vec::new(),
            })
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn execute(&self, request: &PreparedRequest, _timeout: Duration) -> RawOutcome {
        self.record(DispatchKind::Data, request)
    }

    async fn upload(&self, request: &PreparedRequest, _timeout: Duration) -> RawOutcome {
        self.record(DispatchKind::Upload, request)
    }
}
