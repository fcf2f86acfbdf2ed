use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};
use tracing::debug;

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close descriptor as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: u16,
    pub reason: String,
}

/// One inbound transport event.
#[derive(Debug)]
pub enum Frame {
    Text(String),
    Close(Option<CloseFrame>),
}

/// A live bidirectional text-message channel.
#[async_trait]
pub trait Connection: Send {
    async fn send(&mut self, text: String) -> Result<(), ClientError>;

    /// Next inbound frame; `None` once the stream is exhausted.
    async fn recv(&mut self) -> Option<Result<Frame, ClientError>>;

    async fn close(&mut self);
}

/// Opens [`Connection`]s for an endpoint URL.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, ClientError>;
}

/// Production connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

struct WsConnection {
    stream: WsStream,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ClientError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<Frame, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(Frame::Text(text.to_string()))),
                Ok(Message::Close(frame)) => {
                    return Some(Ok(Frame::Close(frame.map(|f| CloseFrame {
                        code: f.code.into(),
                        reason: f.reason.to_string(),
                    }))));
                }
                // Ping/pong and binary frames are transport noise here.
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::TransportReceive(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, ClientError> {
        debug!(%url, "opening websocket");
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;
        Ok(Box::new(WsConnection { stream }))
    }
}
