//! HTTP Request Executor
//!
//! Executes one logical call (plain request, multipart upload, or repeating
//! long-poll) against an injected [`HttpTransport`], and reports a composed
//! [`Response`]. Owns the retry policy: transport timeouts and client
//! cancellations are retried up to the configured count with strictly
//! sequential attempts; every other failure surfaces immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use uuid::Uuid;

use crate::endpoint::Endpoint;
use crate::error::ErrorKind;
use crate::http::encode::{self, MultipartPart, PreparedRequest};
use crate::http::response::Response;
use crate::http::transport::{HttpTransport, RawOutcome};
use crate::logging::{RequestLogger, RequestRecord, ResponseRecord, TrafficReporter};

/// Bounded retry policy for one logical call.
///
/// `retries` is the number of re-attempts after the first; a call makes at
/// most `retries + 1` attempts. The default is zero retries: an implicit
/// extra attempt can duplicate non-idempotent calls, so callers opt in.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        RetryPolicy { retries, delay }
    }
}

#[derive(Clone, Copy)]
enum DispatchClass {
    Data,
    Upload,
}

/// Cooperative stop control handed to long-poll handlers.
#[derive(Clone)]
pub struct LongPollStop {
    stopped: Arc<AtomicBool>,
    wakeup: Arc<Notify>,
}

impl LongPollStop {
    /// Requests that the long-poll sequence ends. The in-flight request, if
    /// any, is not aborted; no further requests are issued.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wakeup.notify_waiters();
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct LongPollHandle {
    stop: LongPollStop,
}

/// Executes logical HTTP calls with retry, upload, and long-poll support.
///
/// Cloning is cheap; clones share the transport, the logger tap, and the
/// single long-poll slot.
///
/// # Example
///
/// ```ignore
/// use lanyard_core::http::{HttpExecutor, ReqwestTransport, RetryPolicy};
/// use lanyard_core::Endpoint;
/// use std::sync::Arc;
///
/// let transport = Arc::new(ReqwestTransport::new(None)?);
/// let executor = HttpExecutor::new(transport);
/// let response = executor
///     .request(&Endpoint::new("https://api.example.com", "/items"), RetryPolicy::default())
///     .await;
/// ```
#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn HttpTransport>,
    reporter: Option<TrafficReporter>,
    long_poll: Arc<Mutex<Option<LongPollHandle>>>,
}

impl HttpExecutor {
    /// Creates an executor over the given transport, with logging disabled.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        HttpExecutor {
            transport,
            reporter: None,
            long_poll: Arc::new(Mutex::new(None)),
        }
    }

    /// Attaches a logger sink. Records are delivered from a single reporter
    /// task and never influence retry or response semantics.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.reporter = Some(TrafficReporter::spawn(logger));
        self
    }

    /// Executes one logical call and returns its terminal [`Response`].
    pub async fn request(&self, endpoint: &Endpoint, retry: RetryPolicy) -> Response {
        match encode::prepare(endpoint) {
            Ok(prepared) => {
                self.perform(prepared, endpoint.timeout, retry, DispatchClass::Data)
                    .await
            }
            Err(kind) => self.fail_without_transport(kind),
        }
    }

    /// Callback-style variant of [`request`](Self::request) with identical
    /// retry semantics; the completion receives the terminal response
    /// exactly once.
    pub fn request_with_callback<F>(&self, endpoint: Endpoint, retry: RetryPolicy, completion: F)
    where
        F: FnOnce(Response) + Send + 'static,
    {
        let executor = self.clone();
        tokio::spawn(async move {
            let response = executor.request(&endpoint, retry).await;
            completion(response);
        });
    }

    /// Executes a multipart upload with identical retry semantics.
    ///
    /// The upload goes through the transport's distinct upload entry point,
    /// so concurrent uploads do not block concurrent simple requests.
    pub async fn multipart(
        &self,
        endpoint: &Endpoint,
        parts: &[MultipartPart],
        retry: RetryPolicy,
    ) -> Response {
        match encode::prepare_multipart(endpoint, parts) {
            Ok(prepared) => {
                self.perform(prepared, endpoint.timeout, retry, DispatchClass::Upload)
                    .await
            }
            Err(kind) => self.fail_without_transport(kind),
        }
    }

    /// Callback-style variant of [`multipart`](Self::multipart).
    pub fn multipart_with_callback<F>(
        &self,
        endpoint: Endpoint,
        parts: Vec<MultipartPart>,
        retry: RetryPolicy,
        completion: F,
    ) where
        F: FnOnce(Response) + Send + 'static,
    {
        let executor = self.clone();
        tokio::spawn(async move {
            let response = executor.multipart(&endpoint, &parts, retry).await;
            completion(response);
        });
    }

    /// Repeats `request` on a fixed period until stopped.
    ///
    /// The first request fires immediately, then one per interval tick. The
    /// handler may end the sequence through the supplied [`LongPollStop`];
    /// [`stop_long_polling`](Self::stop_long_polling) does the same from
    /// outside. Only one long-poll sequence is active per executor;
    /// starting a new one stops any prior one.
    pub fn start_long_polling<F>(
        &self,
        endpoint: Endpoint,
        interval: Duration,
        retry: RetryPolicy,
        mut handler: F,
    ) where
        F: FnMut(Response, &LongPollStop) + Send + 'static,
    {
        if let Some(previous) = self.long_poll.lock().unwrap().take() {
            previous.stop.stop();
        }

        let stop = LongPollStop {
            stopped: Arc::new(AtomicBool::new(false)),
            wakeup: Arc::new(Notify::new()),
        };

        let executor = self.clone();
        let poll_stop = stop.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = poll_stop.wakeup.notified() => break,
                    _ = ticker.tick() => {}
                }
                if poll_stop.is_stopped() {
                    break;
                }
                let response = executor.request(&endpoint, retry).await;
                handler(response, &poll_stop);
                if poll_stop.is_stopped() {
                    break;
                }
            }
            tracing::debug!("long-poll sequence ended");
        });

        *self.long_poll.lock().unwrap() = Some(LongPollHandle { stop });
    }

    /// Cooperatively ends the active long-poll sequence, if any.
    ///
    /// The period timer is invalidated; an in-flight request is left to
    /// finish on its own.
    pub fn stop_long_polling(&self) {
        if let Some(handle) = self.long_poll.lock().unwrap().take() {
            handle.stop.stop();
        }
    }

    /// Iterative bounded retry loop; attempts are strictly sequential.
    async fn perform(
        &self,
        prepared: PreparedRequest,
        timeout: Duration,
        retry: RetryPolicy,
        class: DispatchClass,
    ) -> Response {
        let mut remaining = retry.retries;
        loop {
            let attempt_id = Uuid::new_v4();
            self.report_issued(attempt_id, &prepared);

            let outcome = match class {
                DispatchClass::Data => self.transport.execute(&prepared, timeout).await,
                DispatchClass::Upload => self.transport.upload(&prepared, timeout).await,
            };

            let retryable = matches!(&outcome, RawOutcome::Failed(f) if f.is_retryable());
            let response = Response::from_outcome(outcome);
            self.report_received(attempt_id, &response);

            if retryable && remaining > 0 {
                remaining -= 1;
                tracing::debug!(
                    url = %prepared.url,
                    remaining,
                    delay_ms = retry.delay.as_millis() as u64,
                    "transient transport failure, retrying"
                );
                tokio::time::sleep(retry.delay).await;
                continue;
            }
            return response;
        }
    }

    fn fail_without_transport(&self, kind: ErrorKind) -> Response {
        let response = Response::from_error(kind);
        // Construction failures still reach the logger, with no request pair.
        self.report_received(Uuid::new_v4(), &response);
        response
    }

    fn report_issued(&self, id: Uuid, prepared: &PreparedRequest) {
        if let Some(reporter) = &self.reporter {
            reporter.issued(
                id,
                RequestRecord {
                    method: prepared.method.as_str().to_string(),
                    url: prepared.url.to_string(),
                    headers: prepared.headers.clone(),
                    body: prepared.body.clone(),
                },
            );
        }
    }

    fn report_received(&self, id: Uuid, response: &Response) {
        if let Some(reporter) = &self.reporter {
            let status_code = if response.status_code() > 0 {
                Some(response.status_code())
            } else {
                None
            };
            reporter.received(
                id,
                ResponseRecord {
                    status_code,
                    headers: response.headers().to_vec(),
                    body: response.body().map(<[u8]>::to_vec),
                    error: response.error().cloned(),
                },
            );
        }
    }
}
