//! One transport connection to one named metric channel.

use tokio::sync::mpsc;

use super::{ChannelEvent, FrameStream, Transport, TransportError};

/// Owns a live transport connection for a single channel.
///
/// The connection performs no retry of its own - when the transport drops,
/// [`pump`](Self::pump) returns the cause and the reconnect supervisor
/// decides what happens next. Dropping the connection (including mid-`pump`,
/// when the supervisor races it against shutdown) closes the socket.
pub struct ChannelConnection {
    channel: String,
    stream: Box<dyn FrameStream>,
}

impl ChannelConnection {
    /// Open a connection subscribed to `channel`.
    pub async fn open(
        transport: &dyn Transport,
        channel: &str,
    ) -> Result<Self, TransportError> {
        let stream = transport.connect(channel).await?;
        Ok(Self { channel: channel.to_string(), stream })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Forward frames to `events` until the transport drops.
    ///
    /// Returns the cause of loss. Consumes the connection, so the socket is
    /// released on every exit path.
    pub async fn pump(mut self, events: &mpsc::Sender<ChannelEvent>) -> String {
        loop {
            match self.stream.next_frame().await {
                Ok(Some(payload)) => {
                    let event = ChannelEvent::Frame {
                        channel: self.channel.clone(),
                        payload,
                    };
                    if events.send(event).await.is_err() {
                        return "consumer dropped".to_string();
                    }
                }
                Ok(None) => return TransportError::Closed.to_string(),
                Err(e) => return e.to_string(),
            }
        }
    }
}
