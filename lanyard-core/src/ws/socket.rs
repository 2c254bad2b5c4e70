//! Socket Transport
//!
//! Connector/stream seam for the WebSocket session manager, with the
//! production implementation over tokio-tungstenite. The session driver only
//! ever sees [`Frame`]s and [`SessionError`]s, so tests substitute
//! [`MockSocketConnector`](crate::ws::MockSocketConnector) without touching
//! the driver.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};

use crate::endpoint::Endpoint;
use crate::error::{ClientError, SessionError};
use crate::pinning::CertificateSet;
use crate::tls;

/// One received or outgoing WebSocket frame, transport-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
}

/// An open socket: ordered frame receipt, frame send, and close.
#[async_trait]
pub trait SocketStream: Send {
    /// Receives the next frame. Peer closure and transport faults are both
    /// receive errors; the driver decides whether to reconnect.
    async fn next_frame(&mut self) -> Result<Frame, SessionError>;

    /// Sends one frame.
    async fn send_frame(&mut self, frame: Frame) -> Result<(), SessionError>;

    /// Closes the socket with the given close code and reason.
    async fn close(&mut self, code: u16, reason: &str) -> Result<(), SessionError>;
}

/// Opens sockets for the session manager.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    /// Opens a socket to the endpoint with its headers applied.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn SocketStream>, SessionError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Production connector over tokio-tungstenite with the shared TLS config.
pub struct TungsteniteConnector {
    tls_config: Arc<rustls::ClientConfig>,
}

impl TungsteniteConnector {
    /// Builds a connector with optional certificate pinning; the pin set
    /// feeds the same validation routine as the HTTP path.
    pub fn new(pins: Option<CertificateSet>) -> Result<Self, ClientError> {
        Ok(TungsteniteConnector {
            tls_config: tls::client_config(pins)?,
        })
    }
}

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn SocketStream>, SessionError> {
        let mut request = endpoint
            .url_string()
            .into_client_request()
            .map_err(|e| SessionError::ConnectFailed(e.to_string()))?;

        if let Some(headers) = &endpoint.headers {
            for (name, value) in headers {
                let name: tokio_tungstenite::tungstenite::http::HeaderName = name
                    .parse()
                    .map_err(|_| SessionError::ConnectFailed(format!("bad header: {}", name)))?;
                let value = value
                    .parse()
                    .map_err(|_| SessionError::ConnectFailed(format!("bad header value: {}", name)))?;
                request.headers_mut().insert(name, value);
            }
        }

        let (stream, _response) = tokio_tungstenite::connect_async_tls_with_config(
            request,
            None,
            false,
            Some(Connector::Rustls(self.tls_config.clone())),
        )
        .await
        .map_err(|e| SessionError::ConnectFailed(e.to_string()))?;

        Ok(Box::new(TungsteniteSocket { stream }))
    }
}

struct TungsteniteSocket {
    stream: WsStream,
}

#[async_trait]
impl SocketStream for TungsteniteSocket {
    async fn next_frame(&mut self) -> Result<Frame, SessionError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Frame::Text(text.to_string())),
                Some(Ok(Message::Binary(data))) => return Ok(Frame::Binary(data.to_vec())),
                // tungstenite queues the pong reply itself; surface the ping
                // so liveness still registers.
                Some(Ok(Message::Ping(_))) => return Ok(Frame::Ping),
                Some(Ok(Message::Pong(_))) => return Ok(Frame::Pong),
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (
                            Some(u16::from(frame.code)),
                            Some(frame.reason.to_string()),
                        ),
                        None => (None, None),
                    };
                    return Err(SessionError::Closed { code, reason });
                }
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => return Err(SessionError::ReceiveFailed(e.to_string())),
                None => {
                    return Err(SessionError::Closed {
                        code: None,
                        reason: None,
                    })
                }
            }
        }
    }

    async fn send_frame(&mut self, frame: Frame) -> Result<(), SessionError> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
            Frame::Ping => Message::Ping(Vec::new().into()),
            Frame::Pong => Message::Pong(Vec::new().into()),
        };
        self.stream
            .send(message)
            .await
            .map_err(|e| SessionError::SendFailed(e.to_string()))
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), SessionError> {
        self.stream
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_string().into(),
            }))
            .await
            .map_err(|e| SessionError::SendFailed(e.to_string()))
    }
}
