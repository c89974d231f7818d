//! Reconnect supervision for metric channels.
//!
//! A supervisor task wraps each [`ChannelConnection`] and is the only
//! component aware of user interaction. On transport failure it either backs
//! off and reopens (auto policy) or asks the operator to choose between
//! retry and abandon (interactive policy).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::{ChannelConnection, ChannelEvent, Transport};

/// What to do when a channel's transport fails.
#[derive(Debug, Clone)]
pub enum ReconnectPolicy {
    /// Reopen without operator involvement, backing off exponentially.
    Auto(Backoff),
    /// Ask the operator: retry or abandon.
    Interactive,
}

/// Exponential backoff for the auto policy.
///
/// The observed system retried immediately and forever; the backoff and the
/// optional attempt cap keep a dead broker from being hammered.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    /// `None` retries indefinitely (still backed off).
    pub max_retries: Option<u32>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based), doubling up to `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// The operator's answer to a reconnect prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Abandon,
}

/// A pending operator decision under the interactive policy.
///
/// The supervisor parks on `respond` until the TUI answers; dropping the
/// sender counts as abandon.
#[derive(Debug)]
pub struct ReconnectPrompt {
    pub channel: String,
    pub cause: String,
    pub respond: oneshot::Sender<RetryDecision>,
}

/// Supervise one channel until it is abandoned, retries are exhausted, or
/// shutdown is signalled.
///
/// Emits [`ChannelEvent`]s for every state transition. A successful open
/// resets the failure counter, so the cap bounds *consecutive* failures.
pub async fn supervise(
    transport: Arc<dyn Transport>,
    channel: String,
    events: mpsc::Sender<ChannelEvent>,
    policy: ReconnectPolicy,
    prompts: mpsc::Sender<ReconnectPrompt>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failures: u32 = 0;

    loop {
        if events
            .send(ChannelEvent::Connecting { channel: channel.clone() })
            .await
            .is_err()
        {
            return;
        }

        let opened = tokio::select! {
            _ = shutdown.changed() => return,
            opened = ChannelConnection::open(transport.as_ref(), &channel) => opened,
        };

        let cause = match opened {
            Ok(connection) => {
                if events
                    .send(ChannelEvent::Opened { channel: channel.clone() })
                    .await
                    .is_err()
                {
                    return;
                }
                info!(channel = %channel, "channel open");
                failures = 0;
                // Racing pump against shutdown drops the connection, which
                // releases the socket.
                tokio::select! {
                    _ = shutdown.changed() => return,
                    cause = connection.pump(&events) => cause,
                }
            }
            Err(e) => e.to_string(),
        };

        warn!(channel = %channel, %cause, "channel lost");
        failures += 1;
        if events
            .send(ChannelEvent::Lost { channel: channel.clone(), cause: cause.clone() })
            .await
            .is_err()
        {
            return;
        }

        match &policy {
            ReconnectPolicy::Auto(backoff) => {
                if let Some(cap) = backoff.max_retries {
                    if failures > cap {
                        let _ = events
                            .send(ChannelEvent::Failed {
                                channel: channel.clone(),
                                cause: format!("gave up after {cap} retries: {cause}"),
                            })
                            .await;
                        return;
                    }
                }
                let delay = backoff.delay(failures);
                debug!(channel = %channel, ?delay, failures, "backing off before reopen");
                tokio::select! {
                    _ = shutdown.changed() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            ReconnectPolicy::Interactive => {
                let (respond, answer) = oneshot::channel();
                let prompt = ReconnectPrompt {
                    channel: channel.clone(),
                    cause: cause.clone(),
                    respond,
                };
                if prompts.send(prompt).await.is_err() {
                    return;
                }
                let decision = tokio::select! {
                    _ = shutdown.changed() => return,
                    answer = answer => answer.unwrap_or(RetryDecision::Abandon),
                };
                match decision {
                    RetryDecision::Retry => {
                        info!(channel = %channel, "operator chose retry");
                    }
                    RetryDecision::Abandon => {
                        info!(channel = %channel, "operator abandoned channel");
                        let _ = events
                            .send(ChannelEvent::Failed {
                                channel: channel.clone(),
                                cause: "abandoned by operator".to_string(),
                            })
                            .await;
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{FrameStream, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures_before_success` connect attempts, then
    /// serves a stream that stays open until the test ends.
    struct FlakyTransport {
        attempts: AtomicU32,
        failures_before_success: u32,
    }

    impl FlakyTransport {
        fn new(failures_before_success: u32) -> Self {
            Self { attempts: AtomicU32::new(0), failures_before_success }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    struct PendingStream;

    #[async_trait]
    impl FrameStream for PendingStream {
        async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
            std::future::pending().await
        }
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn connect(
            &self,
            _channel: &str,
        ) -> Result<Box<dyn FrameStream>, TransportError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.failures_before_success {
                Err(TransportError::Connect(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )))
            } else {
                Ok(Box::new(PendingStream))
            }
        }
    }

    fn harness() -> (
        mpsc::Sender<ChannelEvent>,
        mpsc::Receiver<ChannelEvent>,
        mpsc::Sender<ReconnectPrompt>,
        mpsc::Receiver<ReconnectPrompt>,
        watch::Sender<bool>,
        watch::Receiver<bool>,
    ) {
        let (events_tx, events_rx) = mpsc::channel(64);
        let (prompts_tx, prompts_rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (events_tx, events_rx, prompts_tx, prompts_rx, shutdown_tx, shutdown_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_policy_recovers_after_transient_failures() {
        let transport = Arc::new(FlakyTransport::new(4));
        let (events_tx, mut events_rx, prompts_tx, _prompts_rx, _sd_tx, sd_rx) = harness();

        let task = tokio::spawn(supervise(
            transport.clone(),
            "commits".to_string(),
            events_tx,
            ReconnectPolicy::Auto(Backoff::default()),
            prompts_tx,
            sd_rx,
        ));

        // Collect events until the channel comes up (paused time auto-advances
        // through the backoff sleeps).
        let mut attempts_seen = 0;
        loop {
            match events_rx.recv().await.unwrap() {
                ChannelEvent::Connecting { .. } => attempts_seen += 1,
                ChannelEvent::Opened { .. } => break,
                ChannelEvent::Lost { .. } => {}
                other => panic!("unexpected event: {other:?}"),
            }
        }

        assert_eq!(attempts_seen, 5, "four failures then one success");
        assert_eq!(transport.attempts(), 5);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_policy_retry_cap_gives_up() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let (events_tx, mut events_rx, prompts_tx, _prompts_rx, _sd_tx, sd_rx) = harness();

        let backoff = Backoff {
            initial: Duration::from_millis(10),
            max: Duration::from_millis(100),
            max_retries: Some(3),
        };
        let task = tokio::spawn(supervise(
            transport.clone(),
            "commits".to_string(),
            events_tx,
            ReconnectPolicy::Auto(backoff),
            prompts_tx,
            sd_rx,
        ));

        let mut failed = None;
        while let Some(event) = events_rx.recv().await {
            if let ChannelEvent::Failed { cause, .. } = event {
                failed = Some(cause);
            }
        }
        task.await.unwrap();

        // Initial attempt plus three retries
        assert_eq!(transport.attempts(), 4);
        assert!(failed.unwrap().contains("gave up after 3 retries"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interactive_retry_reopens() {
        let transport = Arc::new(FlakyTransport::new(1));
        let (events_tx, mut events_rx, prompts_tx, mut prompts_rx, _sd_tx, sd_rx) = harness();

        let task = tokio::spawn(supervise(
            transport.clone(),
            "uptime".to_string(),
            events_tx,
            ReconnectPolicy::Interactive,
            prompts_tx,
            sd_rx,
        ));

        let prompt = prompts_rx.recv().await.unwrap();
        assert_eq!(prompt.channel, "uptime");
        assert!(prompt.cause.contains("connection refused"));
        prompt.respond.send(RetryDecision::Retry).unwrap();

        loop {
            if let ChannelEvent::Opened { .. } = events_rx.recv().await.unwrap() {
                break;
            }
        }
        assert_eq!(transport.attempts(), 2);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_interactive_abandon_is_permanent() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let (events_tx, mut events_rx, prompts_tx, mut prompts_rx, _sd_tx, sd_rx) = harness();

        let task = tokio::spawn(supervise(
            transport.clone(),
            "uptime".to_string(),
            events_tx,
            ReconnectPolicy::Interactive,
            prompts_tx,
            sd_rx,
        ));

        let prompt = prompts_rx.recv().await.unwrap();
        prompt.respond.send(RetryDecision::Abandon).unwrap();

        let mut saw_failed = false;
        while let Some(event) = events_rx.recv().await {
            if let ChannelEvent::Failed { cause, .. } = event {
                assert!(cause.contains("abandoned"));
                saw_failed = true;
            }
        }
        task.await.unwrap();

        assert!(saw_failed);
        // Exactly the one open attempt; abandoning stops all further opens
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_supervisor() {
        let transport = Arc::new(FlakyTransport::new(0));
        let (events_tx, mut events_rx, prompts_tx, _prompts_rx, sd_tx, sd_rx) = harness();

        let task = tokio::spawn(supervise(
            transport,
            "commits".to_string(),
            events_tx,
            ReconnectPolicy::Auto(Backoff::default()),
            prompts_tx,
            sd_rx,
        ));

        loop {
            if let ChannelEvent::Opened { .. } = events_rx.recv().await.unwrap() {
                break;
            }
        }

        sd_tx.send(true).unwrap();
        task.await.unwrap();
        // Supervisor exited; the events channel is closed
        assert!(events_rx.recv().await.is_none());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let backoff = Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(1500),
            max_retries: None,
        };
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(4), Duration::from_millis(800));
        assert_eq!(backoff.delay(5), Duration::from_millis(1500));
        assert_eq!(backoff.delay(30), Duration::from_millis(1500));
    }
}
