//! WebSocket Layer
//!
//! One logical socket connection with heartbeat, liveness detection, and
//! automatic reconnection.
//!
//! # Architecture
//!
//! - **Socket seam**: connector/stream traits with a tokio-tungstenite
//!   implementation and a scripted mock for testing
//! - **Session manager**: driver task owning the socket; state machine
//!   Disconnected → Connecting → Connected ⇄ Reconnecting → Disconnected
//! - **Observer**: notification interface, all methods default no-ops
//! - **Monitor**: network-liveness probe, diagnostics only
//!
//! # Example
//!
//! ```ignore
//! use lanyard_core::ws::{SessionConfig, TungsteniteConnector, WebSocketManager};
//! use lanyard_core::Endpoint;
//! use std::sync::Arc;
//!
//! let connector = Arc::new(TungsteniteConnector::new(None)?);
//! let manager = WebSocketManager::new(connector, observer, SessionConfig::default());
//! manager.connect(Endpoint::new("wss://relay.example.com", "/ws")).await?;
//! ```

mod mock;
mod monitor;
mod observer;
mod session;
mod socket;

pub use mock::{MockScript, MockSocketConnector};
pub use observer::{NullObserver, SessionObserver};
pub use session::{SessionConfig, WebSocketManager, CLOSE_NORMAL};
pub use socket::{Frame, SocketConnector, SocketStream, TungsteniteConnector};
