use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use super::EiscpError;
use super::Message;
use super::Request;
use super::Result;
use super::packet;

pub const DEFAULT_PORT: u16 = 60128;

/// An open EISCP session with one receiver.
///
/// This trait allows for mocking the receiver for testing purposes
#[async_trait]
pub trait Connection: Send {
    /// Send one command
    async fn send(&mut self, request: &Request) -> Result<()>;

    /// Wait for the next message from the receiver
    ///
    /// Returns `Ok(None)` once the receiver has closed the connection. Must be
    /// safe to cancel, since callers wrap it in a timeout.
    async fn recv(&mut self) -> Result<Option<Message>>;

    /// Close the session
    async fn close(&mut self) -> Result<()>;
}

/// Something that can open a [`Connection`].
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    async fn connect(&self) -> Result<Self::Connection>;

    /// Where this connector points, for log messages.
    fn describe(&self) -> String;
}

/// Run `f` on a fresh connection, closing it afterwards.
///
/// The connection is closed whatever `f` returns. Only a failure to connect
/// is reported as an error.
pub async fn with_connection<K, T>(
    connector: &K,
    f: impl AsyncFnOnce(&mut K::Connection) -> T,
) -> Result<T>
where
    K: Connector,
{
    let mut conn = connector.connect().await?;
    debug!("Connected to {}", connector.describe());

    let result = f(&mut conn).await;

    if let Err(e) = conn.close().await {
        debug!("Error closing connection to {}: {}", connector.describe(), e);
    }
    Ok(result)
}

/// Connects to a receiver over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, port: u16, connect_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Connection = TcpConnection;

    async fn connect(&self) -> Result<TcpConnection> {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let stream = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| EiscpError::ConnectTimeout(self.describe()))??;
        stream.set_nodelay(true)?;

        Ok(TcpConnection {
            stream,
            buf: Vec::new(),
        })
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// EISCP over a TCP stream
pub struct TcpConnection {
    stream: TcpStream,

    /// Bytes read but not yet decoded into a packet
    buf: Vec<u8>,
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send(&mut self, request: &Request) -> Result<()> {
        debug!("Sending {}", request);
        self.stream.write_all(&request.to_packet()).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Message>> {
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(body) = packet::decode(&mut self.buf)? {
                return Message::decode(&body).map(Some);
            }

            // `read` is cancel safe; partial packets stay in `buf`.
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(None);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
