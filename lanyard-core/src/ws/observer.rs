//! Session Observer
//!
//! Notification interface for WebSocket session consumers. Every method has
//! a default no-op body, so observers implement only what they care about.
//! The session manager holds the observer as a shared reference and never
//! controls its lifetime.

use crate::error::SessionError;

/// Receives session lifecycle and message notifications.
///
/// All callbacks are delivered sequentially from the session's driver task;
/// a frame is not re-armed until the previous callback returns.
pub trait SessionObserver: Send + Sync {
    /// The session confirmed application-level liveness (first frame received).
    fn on_connect(&self) {}

    /// The session ended; `reason` carries the close or failure description.
    fn on_disconnect(&self, _code: Option<u16>, _reason: Option<&str>) {}

    /// A dropped connection was re-established and confirmed live again.
    /// Always preceded by [`on_connect`](Self::on_connect) for the new
    /// connection.
    fn on_reconnected(&self) {}

    /// A text frame arrived.
    fn on_text_message(&self, _text: &str) {}

    /// A binary frame arrived.
    fn on_binary_message(&self, _data: &[u8]) {}

    /// A transport fault occurred (receive, send, ping, or connect failure).
    /// Reported before any reconnection attempt is scheduled.
    fn on_error(&self, _error: &SessionError) {}
}

/// Observer that ignores everything. Useful as a placeholder.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}
