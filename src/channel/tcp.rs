//! TCP transport speaking the broker's telemetry wire contract.
//!
//! One connection per channel: the client connects to the broker's status
//! endpoint, writes the channel name followed by a newline, and the broker
//! streams newline-delimited JSON frames for that channel from then on.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use super::{FrameStream, Transport, TransportError};

/// Connects to `host:port` and subscribes to a channel by name.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    addr: String,
}

impl TcpTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, channel: &str) -> Result<Box<dyn FrameStream>, TransportError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(TransportError::Connect)?;
        let (read_half, mut write_half) = stream.into_split();

        write_half
            .write_all(format!("{channel}\n").as_bytes())
            .await
            .map_err(TransportError::Connect)?;

        Ok(Box::new(TcpFrameStream {
            lines: BufReader::new(read_half).lines(),
            // Keeping the write half alive keeps the subscription open;
            // dropping the stream drops both halves and releases the socket.
            _write: write_half,
        }))
    }
}

struct TcpFrameStream {
    lines: Lines<BufReader<OwnedReadHalf>>,
    _write: OwnedWriteHalf,
}

#[async_trait]
impl FrameStream for TcpFrameStream {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Ok(Some(line)),
            Ok(None) => Ok(None),
            Err(e) => Err(TransportError::Read(e)),
        }
    }
}
