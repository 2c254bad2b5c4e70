//! WebSocket Session Manager
//!
//! Owns one logical socket connection: connect/disconnect, send, the receive
//! loop, heartbeat, reconnection, and network-liveness observation. The
//! session is `Connected` only once the first frame has been received;
//! socket-open alone does not confirm application-level liveness.
//!
//! A single driver task owns the socket and makes every observer callback,
//! so notifications are sequential and in arrival order. Heartbeat pings
//! interleave freely with sends and receives; they share the socket but not
//! application state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::SessionError;
use crate::ws::monitor::NetworkMonitor;
use crate::ws::observer::SessionObserver;
use crate::ws::socket::{Frame, SocketConnector};

/// Close code for a normal closure, used when the caller gives none.
pub const CLOSE_NORMAL: u16 = 1000;

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Heartbeat ping period. Zero disables the heartbeat.
    pub heartbeat_interval: Duration,
    /// Fixed delay before a reconnect attempt.
    pub reconnect_backoff: Duration,
    /// Whether receive failures schedule a reconnect.
    pub auto_reconnect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            heartbeat_interval: Duration::from_secs(15),
            reconnect_backoff: Duration::from_secs(2),
            auto_reconnect: true,
        }
    }
}

enum Command {
    SendText(String),
    SendBinary(Vec<u8>),
    Disconnect { code: u16, reason: Option<String> },
}

#[derive(Default)]
struct SessionState {
    connected: AtomicBool,
    reconnecting: AtomicBool,
}

impl SessionState {
    fn clear(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.reconnecting.store(false, Ordering::SeqCst);
    }
}

struct Active {
    commands: mpsc::UnboundedSender<Command>,
    driver: JoinHandle<()>,
    monitor: NetworkMonitor,
}

/// Manages one logical WebSocket connection.
///
/// The observer is held as a shared reference; the manager never controls
/// its lifetime.
///
/// # Example
///
/// ```ignore
/// use lanyard_core::ws::{WebSocketManager, SessionConfig, TungsteniteConnector};
/// use lanyard_core::Endpoint;
/// use std::sync::Arc;
///
/// let connector = Arc::new(TungsteniteConnector::new(None)?);
/// let manager = WebSocketManager::new(connector, observer, SessionConfig::default());
/// manager.connect(Endpoint::new("wss://relay.example.com", "/ws")).await?;
/// manager.send_text("hello");
/// manager.disconnect(None, None).await;
/// ```
pub struct WebSocketManager {
    connector: Arc<dyn SocketConnector>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
    state: Arc<SessionState>,
    active: Mutex<Option<Active>>,
}

impl WebSocketManager {
    /// Creates a manager; no connection is opened until [`connect`](Self::connect).
    pub fn new(
        connector: Arc<dyn SocketConnector>,
        observer: Arc<dyn SessionObserver>,
        config: SessionConfig,
    ) -> Self {
        WebSocketManager {
            connector,
            observer,
            config,
            state: Arc::new(SessionState::default()),
            active: Mutex::new(None),
        }
    }

    /// Opens a connection to the endpoint and starts the receive loop,
    /// heartbeat, and network-liveness observation.
    ///
    /// Returns once the driver is launched; `is_connected` stays false until
    /// the first frame arrives. Connecting while a session is active first
    /// tears the existing one down, so two heartbeats or receive loops never
    /// race.
    pub async fn connect(&self, endpoint: Endpoint) -> Result<(), SessionError> {
        let url = Url::parse(&endpoint.url_string())
            .map_err(|_| SessionError::ConnectFailed("invalid endpoint URL".into()))?;
        let host = url
            .host_str()
            .ok_or_else(|| SessionError::ConnectFailed("endpoint URL has no host".into()))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(443);

        self.teardown(CLOSE_NORMAL, None).await;

        let (tx, rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(drive(
            self.connector.clone(),
            self.observer.clone(),
            self.config.clone(),
            self.state.clone(),
            endpoint,
            rx,
        ));
        let monitor = NetworkMonitor::start(host, port);

        *self.active.lock().unwrap() = Some(Active {
            commands: tx,
            driver,
            monitor,
        });
        Ok(())
    }

    /// Closes the session.
    ///
    /// The network monitor and heartbeat stop before the socket is closed
    /// with `code` (normal closure by default); observers are notified with
    /// the resolved reason. No receive re-arm happens afterwards.
    pub async fn disconnect(&self, code: Option<u16>, reason: Option<String>) {
        self.teardown(code.unwrap_or(CLOSE_NORMAL), reason).await;
    }

    /// Sends a text frame. No-op without an active socket; send failures are
    /// reported to observers, never returned.
    pub fn send_text(&self, text: &str) {
        self.command(Command::SendText(text.to_string()));
    }

    /// Sends a binary frame. Same delivery rules as [`send_text`](Self::send_text).
    pub fn send_binary(&self, data: Vec<u8>) {
        self.command(Command::SendBinary(data));
    }

    /// True once the current connection has received at least one frame.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// True while a reconnect is pending or awaiting its first frame.
    pub fn is_reconnecting(&self) -> bool {
        self.state.reconnecting.load(Ordering::SeqCst)
    }

    /// Last known reachability of the endpoint host (diagnostic only).
    pub fn network_reachable(&self) -> bool {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .map(|active| active.monitor.is_reachable())
            .unwrap_or(false)
    }

    fn command(&self, command: Command) {
        let guard = self.active.lock().unwrap();
        match guard.as_ref() {
            Some(active) => {
                if active.commands.send(command).is_err() {
                    tracing::debug!("session driver gone, dropping frame");
                }
            }
            None => tracing::debug!("no active socket, dropping frame"),
        }
    }

    async fn teardown(&self, code: u16, reason: Option<String>) {
        let active = self.active.lock().unwrap().take();
        if let Some(active) = active {
            // Monitor first, then the driver winds down its own timer and socket.
            active.monitor.cancel();
            if active
                .commands
                .send(Command::Disconnect { code, reason })
                .is_err()
            {
                active.driver.abort();
            }
            let _ = active.driver.await;
        }
        self.state.clear();
    }
}

impl Drop for WebSocketManager {
    fn drop(&mut self) {
        // Dropping the command sender ends the driver at its next poll.
        self.active.lock().unwrap().take();
    }
}

enum Event {
    Command(Option<Command>),
    Incoming(Result<Frame, SessionError>),
    Heartbeat,
}

/// Driver task: owns the socket, makes every observer callback.
async fn drive(
    connector: Arc<dyn SocketConnector>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
    state: Arc<SessionState>,
    endpoint: Endpoint,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    'connection: loop {
        let mut socket = match connector.connect(&endpoint).await {
            Ok(socket) => socket,
            Err(error) => {
                observer.on_error(&error);
                if config.auto_reconnect {
                    if !backoff(&config, &state, &observer, &mut commands).await {
                        return;
                    }
                    continue 'connection;
                }
                state.clear();
                observer.on_disconnect(None, Some(&error.to_string()));
                return;
            }
        };

        let mut heartbeat = heartbeat_timer(config.heartbeat_interval);
        let mut got_frame = false;

        loop {
            let event = {
                tokio::select! {
                    biased;
                    command = commands.recv() => Event::Command(command),
                    result = socket.next_frame() => Event::Incoming(result),
                    _ = tick(&mut heartbeat) => Event::Heartbeat,
                }
            };

            match event {
                Event::Command(Some(Command::SendText(text))) => {
                    if let Err(error) = socket.send_frame(Frame::Text(text)).await {
                        observer.on_error(&error);
                    }
                }
                Event::Command(Some(Command::SendBinary(data))) => {
                    if let Err(error) = socket.send_frame(Frame::Binary(data)).await {
                        observer.on_error(&error);
                    }
                }
                Event::Command(Some(Command::Disconnect { code, reason })) => {
                    let reason = reason.unwrap_or_else(|| "client disconnect".to_string());
                    let _ = socket.close(code, &reason).await;
                    state.clear();
                    observer.on_disconnect(Some(code), Some(&reason));
                    return;
                }
                Event::Command(None) => {
                    // Manager dropped; close quietly.
                    let _ = socket.close(CLOSE_NORMAL, "client gone").await;
                    state.clear();
                    return;
                }
                Event::Incoming(Ok(frame)) => {
                    if !got_frame {
                        got_frame = true;
                        state.connected.store(true, Ordering::SeqCst);
                        let was_reconnecting =
                            state.reconnecting.swap(false, Ordering::SeqCst);
                        observer.on_connect();
                        if was_reconnecting {
                            tracing::info!(url = %endpoint.url_string(), "reconnect completed");
                            observer.on_reconnected();
                        }
                    }
                    match frame {
                        Frame::Text(text) => observer.on_text_message(&text),
                        Frame::Binary(data) => observer.on_binary_message(&data),
                        // Liveness already registered above.
                        Frame::Ping | Frame::Pong => {}
                    }
                }
                Event::Incoming(Err(error)) => {
                    // Observers always see the failure, even when a
                    // reconnect subsequently succeeds.
                    observer.on_error(&error);
                    state.connected.store(false, Ordering::SeqCst);
                    if config.auto_reconnect {
                        tracing::info!(
                            url = %endpoint.url_string(),
                            backoff_ms = config.reconnect_backoff.as_millis() as u64,
                            "receive failed, scheduling reconnect"
                        );
                        if !backoff(&config, &state, &observer, &mut commands).await {
                            return;
                        }
                        continue 'connection;
                    }
                    let (code, reason) = match &error {
                        SessionError::Closed { code, reason } => (*code, reason.clone()),
                        other => (None, Some(other.to_string())),
                    };
                    state.clear();
                    observer.on_disconnect(code, reason.as_deref());
                    return;
                }
                Event::Heartbeat => {
                    // Ping failures are reported but never trigger reconnection.
                    if let Err(error) = socket.send_frame(Frame::Ping).await {
                        observer.on_error(&error);
                    }
                }
            }
        }
    }
}

/// Waits out the reconnect backoff while still honoring disconnect commands.
/// Returns `false` when the session should end instead of reconnecting.
async fn backoff(
    config: &SessionConfig,
    state: &SessionState,
    observer: &Arc<dyn SessionObserver>,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> bool {
    state.reconnecting.store(true, Ordering::SeqCst);
    let sleep = tokio::time::sleep(config.reconnect_backoff);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(Command::Disconnect { code, reason }) => {
                    state.clear();
                    let reason = reason.unwrap_or_else(|| "client disconnect".to_string());
                    observer.on_disconnect(Some(code), Some(&reason));
                    return false;
                }
                Some(_) => {
                    // No active socket while reconnecting; drop the frame.
                    tracing::debug!("dropping send issued during reconnect backoff");
                }
                None => {
                    state.clear();
                    return false;
                }
            },
            _ = &mut sleep => return true,
        }
    }
}

fn heartbeat_timer(period: Duration) -> Option<tokio::time::Interval> {
    if period.is_zero() {
        return None;
    }
    let mut interval =
        tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    Some(interval)
}

async fn tick(heartbeat: &mut Option<tokio::time::Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
