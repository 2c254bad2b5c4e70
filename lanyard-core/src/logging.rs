//! Request/Response Logging
//!
//! Sink contract for pre- and post-flight traffic records, plus the reporter
//! that delivers them. All sink callbacks are made from a single dedicated
//! task fed by a channel, so UI-facing consumers never observe concurrent
//! calls. The tap is a side channel: it can never affect retry or response
//! semantics.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::ErrorKind;

/// Pre-flight record of one attempt.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Post-flight record of one attempt.
///
/// `status_code` is `None` when the transport failed before an HTTP response
/// existed; `error` then carries the classification.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status_code: Option<i32>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub error: Option<ErrorKind>,
}

/// Receives traffic records for display.
///
/// The same `id` correlates the two calls of one logical attempt; each retry
/// attempt gets its own id.
pub trait RequestLogger: Send + Sync {
    fn on_request_issued(&self, id: Uuid, record: &RequestRecord);
    fn on_response_received(&self, id: Uuid, record: &ResponseRecord);
}

enum LogEvent {
    Issued(Uuid, RequestRecord),
    Received(Uuid, ResponseRecord),
}

/// Fans traffic records into the sink from one task.
#[derive(Clone)]
pub(crate) struct TrafficReporter {
    tx: mpsc::UnboundedSender<LogEvent>,
}

impl TrafficReporter {
    /// Spawns the reporter task. It drains until every reporter clone is
    /// dropped, then exits.
    pub(crate) fn spawn(logger: Arc<dyn RequestLogger>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    LogEvent::Issued(id, record) => logger.on_request_issued(id, &record),
                    LogEvent::Received(id, record) => logger.on_response_received(id, &record),
                }
            }
        });
        TrafficReporter { tx }
    }

    pub(crate) fn issued(&self, id: Uuid, record: RequestRecord) {
        let _ = self.tx.send(LogEvent::Issued(id, record));
    }

    pub(crate) fn received(&self, id: Uuid, record: ResponseRecord) {
        let _ = self.tx.send(LogEvent::Received(id, record));
    }
}
