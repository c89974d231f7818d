//! # brokerwatch
//!
//! A terminal dashboard for watching a broker daemon's live telemetry
//! channels. The daemon pushes JSON frames per metric channel ("uptime",
//! "commits"); brokerwatch keeps one connection per channel alive across
//! transport failures, derives windowed rates from the monotonic counters,
//! and renders them as smoothly scrolling charts.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           Application                          │
//! │  ┌─────────┐     ┌──────────┐     ┌─────────┐     ┌─────────┐  │
//! │  │   app   │────▶│   data   │────▶│   ui    │────▶│Terminal │  │
//! │  │ (state) │     │ (series) │     │(charts) │     │         │  │
//! │  └────┬────┘     └──────────┘     └─────────┘     └─────────┘  │
//! │       │ events                                                 │
//! │       ▼                                                        │
//! │  ┌─────────┐      ┌──────────┐                                 │
//! │  │ channel │─────▶│  decode  │   one supervised connection     │
//! │  │ (tasks) │      │(envelope)│   per metric channel            │
//! │  └─────────┘      └──────────┘                                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`channel`]**: per-metric connections over a pluggable [`Transport`],
//!   supervised by a reconnect policy (silent backoff or operator prompt)
//! - **[`decode`]**: frame parsing into partial-update [`Envelope`]s;
//!   malformed frames are dropped without touching the channel
//! - **[`data`]**: latest-value [`Counters`] and the fixed-capacity
//!   [`SlidingWindowSeries`] that turns counters into rates
//! - **[`app`]**: single-threaded application state driven by channel events
//!   and render ticks
//! - **[`ui`]**: ratatui rendering - scrolling charts, status line, modal
//!   reconnect prompt, dark/light themes
//!
//! ## Usage
//!
//! ```bash
//! # Watch the default broker endpoint (localhost:8080)
//! brokerwatch
//!
//! # Another endpoint, asking before each reconnect
//! brokerwatch --host broker.internal --port 9090 --policy interactive
//! ```
//!
//! ### Driving the series from a library consumer
//!
//! ```
//! use std::time::Duration;
//! use brokerwatch::SlidingWindowSeries;
//!
//! let mut series = SlidingWindowSeries::new(20, 1, Duration::from_secs(1));
//! series.tick(0.0, 0);
//! assert_eq!(series.tick(1.0, 5), 5.0); // five commits in one interval
//! ```

pub mod app;
pub mod channel;
pub mod config;
pub mod data;
pub mod decode;
pub mod events;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use channel::{
    ChannelConnection, ChannelEvent, ConnectionState, ReconnectPolicy, ReconnectPrompt,
    RetryDecision, TcpTransport, Transport,
};
pub use config::{PolicyKind, Settings};
pub use data::{Counters, SlidingWindowSeries};
pub use decode::{decode, DecodeError, Envelope};
pub use ui::Theme;
