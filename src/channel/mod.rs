//! Channel lifecycle for per-metric telemetry streams.
//!
//! Each metric ("uptime", "commits") gets its own logical channel over its
//! own transport connection. Lifecycle is event-driven: a supervisor task per
//! channel owns the connection and reports typed [`ChannelEvent`]s over an
//! mpsc channel to the single-threaded TUI loop, which is the only consumer.
//!
//! The transport is a trait seam so tests can script failures and a future
//! multiplexing transport could slot in without touching the supervisor.

mod connection;
mod reconnect;
mod tcp;

pub use connection::ChannelConnection;
pub use reconnect::{
    supervise, Backoff, ReconnectPolicy, ReconnectPrompt, RetryDecision,
};
pub use tcp::TcpTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Lifecycle state of one metric channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// An open attempt is in flight; no operation is valid yet.
    Connecting,
    /// The transport is up and delivering frames.
    Open,
    /// Shut down in an orderly way (application exit).
    Closed,
    /// The transport dropped, or the channel was abandoned permanently.
    Failed,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Failed => "failed",
        }
    }
}

/// Errors produced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("connection closed by peer")]
    Closed,
}

/// One lifecycle or data event from a channel.
///
/// Events for a given channel arrive strictly in order; events from
/// different channels interleave arbitrarily.
#[derive(Debug)]
pub enum ChannelEvent {
    /// An open attempt has started.
    Connecting { channel: String },
    /// The transport is up; frames may follow.
    Opened { channel: String },
    /// One raw text frame, in arrival order.
    Frame { channel: String, payload: String },
    /// The transport dropped. The reconnect policy decides what happens next.
    Lost { channel: String, cause: String },
    /// Permanently down: retries exhausted or the operator abandoned it.
    Failed { channel: String, cause: String },
}

impl ChannelEvent {
    /// The channel this event belongs to.
    pub fn channel(&self) -> &str {
        match self {
            ChannelEvent::Connecting { channel }
            | ChannelEvent::Opened { channel }
            | ChannelEvent::Frame { channel, .. }
            | ChannelEvent::Lost { channel, .. }
            | ChannelEvent::Failed { channel, .. } => channel,
        }
    }
}

/// Factory for per-channel connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection subscribed to the named channel.
    ///
    /// Opening is asynchronous; the returned stream is live immediately.
    /// Dropping the stream releases the underlying socket.
    async fn connect(&self, channel: &str) -> Result<Box<dyn FrameStream>, TransportError>;
}

/// A live subscription delivering text frames in arrival order.
#[async_trait]
pub trait FrameStream: Send {
    /// Next frame; `Ok(None)` on orderly EOF.
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError>;
}
