// WebSocket implementation of the live telemetry feed
use crate::application::feeds::{TelemetryConnection, TelemetryFeed};
use crate::domain::error::TransportError;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

#[derive(Debug, Clone, Default)]
pub struct WebSocketFeed;

impl WebSocketFeed {
    pub fn new() -> Self {
        Self
    }
}

struct WebSocketConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl TelemetryFeed for WebSocketFeed {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn TelemetryConnection>, TransportError> {
        let (socket, response) = connect_async(endpoint)
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(endpoint, status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WebSocketConnection { socket }))
    }
}

#[async_trait]
impl TelemetryConnection for WebSocketConnection {
    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => tracing::warn!("skipping non-utf8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "peer sent close frame");
                    return None;
                }
                // Ping replies are queued by tungstenite itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => return Some(Err(TransportError::Stream(e.to_string()))),
            }
        }
    }
}
