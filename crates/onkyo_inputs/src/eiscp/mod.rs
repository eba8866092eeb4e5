//! The slice of the EISCP protocol needed to ask a receiver for its input names.

mod command;
mod connection;
mod message;
pub mod packet;

pub use command::IRN;
pub use command::IRN_NAME;
pub use command::Zone;
pub use connection::Connection;
pub use connection::Connector;
pub use connection::DEFAULT_PORT;
pub use connection::TcpConnection;
pub use connection::TcpConnector;
#[cfg(test)]
pub use connection::mock;
pub use connection::with_connection;
pub use message::Message;
pub use message::Request;

#[derive(Debug, thiserror::Error)]
pub enum EiscpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out connecting to {0}")]
    ConnectTimeout(String),

    #[error("Connection closed by receiver")]
    Closed,

    #[error("Bad packet magic {0:?}, expected \"ISCP\"")]
    BadMagic([u8; 4]),

    #[error("Bad packet header size {0}")]
    BadHeaderSize(usize),

    #[error("Packet data size {0} exceeds limit")]
    PacketTooLarge(usize),

    #[error("Malformed message: {0}")]
    Malformed(String),
}

impl EiscpError {
    /// Whether the connection can still be used after this error.
    ///
    /// Only a bad message body leaves the stream in sync; everything else
    /// means the packet boundaries can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EiscpError::Malformed(_))
    }
}

pub type Result<T> = std::result::Result<T, EiscpError>;
