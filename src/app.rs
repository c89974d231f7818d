//! Application state: counters, series, channel status, operator prompts.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use crate::channel::{ChannelEvent, ConnectionState, ReconnectPrompt, RetryDecision};
use crate::config::Settings;
use crate::data::{Counters, SlidingWindowSeries};
use crate::decode::decode;
use crate::ui::Theme;

/// Per-channel bookkeeping for the status line and chart borders.
#[derive(Debug, Clone)]
pub struct ChannelStatus {
    pub state: ConnectionState,
    /// Why the channel last went down, for the prompt and status line.
    pub last_cause: Option<String>,
    pub frames: u64,
    pub last_frame_at: Option<Instant>,
}

impl ChannelStatus {
    fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
            last_cause: None,
            frames: 0,
            last_frame_at: None,
        }
    }
}

/// Main application state.
///
/// Everything here is mutated on the TUI thread only: channel events are
/// drained and applied between redraws, and the render tick reads the
/// counters on the same thread, so mutation and read never interleave.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub dark_mode: bool,
    pub theme: Theme,

    /// Channel names in display order.
    pub channels: Vec<String>,
    pub status: BTreeMap<String, ChannelStatus>,
    pub counters: Counters,
    pub series: BTreeMap<String, SlidingWindowSeries>,

    /// Active operator decision, if a channel is waiting on one.
    pub prompt: Option<ReconnectPrompt>,

    pub decode_errors: u64,
    pub ticks: u64,
    endpoint: String,
    recognized: Vec<String>,
    epoch: Instant,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        let dark_mode = Theme::terminal_is_dark();
        let mut status = BTreeMap::new();
        let mut series = BTreeMap::new();
        for channel in &settings.channels {
            status.insert(channel.clone(), ChannelStatus::new());
            series.insert(
                channel.clone(),
                SlidingWindowSeries::new(
                    settings.capacity,
                    settings.offset,
                    settings.tick_interval(),
                ),
            );
        }

        Self {
            running: true,
            show_help: false,
            dark_mode,
            theme: if dark_mode { Theme::dark() } else { Theme::light() },
            channels: settings.channels.clone(),
            status,
            counters: Counters::new(),
            series,
            prompt: None,
            decode_errors: 0,
            ticks: 0,
            endpoint: settings.endpoint(),
            recognized: settings.channels.clone(),
            epoch: Instant::now(),
        }
    }

    /// Seconds since the app started; the shared clock for all series.
    pub fn now_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// The broker endpoint, for the status line.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Apply one channel event. Decode failures discard the frame only.
    pub fn on_channel_event(&mut self, event: ChannelEvent) {
        let channel = event.channel().to_string();
        let Some(status) = self.status.get_mut(&channel) else {
            return;
        };

        match event {
            ChannelEvent::Connecting { .. } => {
                status.state = ConnectionState::Connecting;
            }
            ChannelEvent::Opened { .. } => {
                status.state = ConnectionState::Open;
                status.last_cause = None;
            }
            ChannelEvent::Frame { payload, .. } => {
                match decode(&payload, &self.recognized) {
                    Ok(envelope) => {
                        self.counters.apply(&envelope);
                        status.frames += 1;
                        status.last_frame_at = Some(Instant::now());
                    }
                    Err(err) => {
                        self.decode_errors += 1;
                        debug!(%channel, %payload, %err, "discarding undecodable frame");
                    }
                }
            }
            ChannelEvent::Lost { cause, .. } => {
                status.state = ConnectionState::Failed;
                status.last_cause = Some(cause);
            }
            ChannelEvent::Failed { cause, .. } => {
                status.state = ConnectionState::Failed;
                status.last_cause = Some(cause);
            }
        }
    }

    /// Park an operator prompt until a key answers it.
    pub fn on_prompt(&mut self, prompt: ReconnectPrompt) {
        self.prompt = Some(prompt);
    }

    /// Answer the active prompt, if any.
    pub fn answer_prompt(&mut self, decision: RetryDecision) {
        if let Some(prompt) = self.prompt.take() {
            // The supervisor emits the follow-up state transitions; a dropped
            // receiver counts as abandon on its side.
            let _ = prompt.respond.send(decision);
        }
    }

    /// One render tick: pull each counter, derive its rate, advance the
    /// window. Runs even when no frame arrived, which is what keeps the
    /// charts scrolling at a steady pace.
    pub fn on_tick(&mut self) {
        let now = self.now_secs();
        self.ticks += 1;
        for (channel, series) in self.series.iter_mut() {
            // A permanently failed channel keeps its last drawn window
            let failed = self
                .status
                .get(channel)
                .is_some_and(|s| s.state == ConnectionState::Failed);
            if failed {
                continue;
            }
            series.tick(now, self.counters.get(channel));
        }
    }

    /// Apply the hosting surface's dark-mode signal.
    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
        self.theme = if dark { Theme::dark() } else { Theme::light() };
    }

    pub fn toggle_dark_mode(&mut self) {
        self.set_dark_mode(!self.dark_mode);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
