//! Mock Socket Transport
//!
//! Scripted implementation of the socket seam for driver tests. Each call to
//! `connect` pops the next [`MockScript`]; its frames are served in order,
//! after which the socket either idles open or reports closure.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::SessionError;
use crate::ws::socket::{Frame, SocketConnector, SocketStream};

/// Scripted behavior for one mock connection.
#[derive(Debug, Default)]
pub struct MockScript {
    /// Frames (or receive errors) served in order.
    pub events: Vec<Result<Frame, SessionError>>,
    /// After the script runs dry: idle open (`true`) or report closure.
    pub hold_open: bool,
}

impl MockScript {
    /// A connection that delivers the given frames, then idles open.
    pub fn frames(frames: Vec<Frame>) -> Self {
        MockScript {
            events: frames.into_iter().map(Ok).collect(),
            hold_open: true,
        }
    }

    /// A connection that delivers the given frames, then drops.
    pub fn frames_then_drop(frames: Vec<Frame>) -> Self {
        MockScript {
            events: frames.into_iter().map(Ok).collect(),
            hold_open: false,
        }
    }
}

/// Mock connector serving one scripted socket per `connect` call.
///
/// Frames sent by the driver (including heartbeat pings) are recorded per
/// connection and inspectable while the driver still owns the socket.
#[derive(Default)]
pub struct MockSocketConnector {
    scripts: Mutex<VecDeque<MockScript>>,
    connects: AtomicUsize,
    sent: Mutex<Vec<Arc<Mutex<Vec<Frame>>>>>,
    closed: Mutex<Vec<Arc<Mutex<Option<(u16, String)>>>>>,
}

impl MockSocketConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the script for the next connection.
    pub fn queue_script(&self, script: MockScript) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Number of `connect` calls made so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Frames the driver sent over connection `index` (0-based).
    pub fn sent_frames(&self, index: usize) -> Vec<Frame> {
        self.sent
            .lock()
            .unwrap()
            .get(index)
            .map(|frames| frames.lock().unwrap().clone())
            .unwrap_or_default()
    }

    /// Close code/reason recorded for connection `index`, if it was closed.
    pub fn close_frame(&self, index: usize) -> Option<(u16, String)> {
        self.closed
            .lock()
            .unwrap()
            .get(index)
            .and_then(|slot| slot.lock().unwrap().clone())
    }
}

#[async_trait]
impl SocketConnector for MockSocketConnector {
    async fn connect(&self, _endpoint: &Endpoint) -> Result<Box<dyn SocketStream>, SessionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SessionError::ConnectFailed("no script queued".into()))?;

        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(Mutex::new(None));
        self.sent.lock().unwrap().push(sent.clone());
        self.closed.lock().unwrap().push(closed.clone());

        Ok(Box::new(MockSocket {
            events: script.events.into(),
            hold_open: script.hold_open,
            sent,
            closed,
        }))
    }
}

struct MockSocket {
    events: VecDeque<Result<Frame, SessionError>>,
    hold_open: bool,
    sent: Arc<Mutex<Vec<Frame>>>,
    closed: Arc<Mutex<Option<(u16, String)>>>,
}

#[async_trait]
impl SocketStream for MockSocket {
    async fn next_frame(&mut self) -> Result<Frame, SessionError> {
        if let Some(event) = self.events.pop_front() {
            return event;
        }
        if self.hold_open {
            // Quiet connection: nothing more arrives.
            std::future::pending::<()>().await;
            unreachable!()
        }
        Err(SessionError::Closed {
            code: None,
            reason: None,
        })
    }

    async fn send_frame(&mut self, frame: Frame) -> Result<(), SessionError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), SessionError> {
        *self.closed.lock().unwrap() = Some((code, reason.to_string()));
        Ok(())
    }
}
