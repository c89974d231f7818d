//! Data models and processing for telemetry counters.
//!
//! ## Submodules
//!
//! - [`counters`]: Latest-known value per metric, updated from decoded envelopes
//! - [`series`]: Sliding-window rate derivation for the scrolling charts
//!
//! ## Data flow
//!
//! ```text
//! Envelope (decoded frame)
//!        │
//!        ▼
//! Counters::apply()            latest value per metric
//!        │
//!        ▼  (once per render tick)
//! SlidingWindowSeries::tick()  derive rate, append sample, evict oldest
//! ```

pub mod counters;
pub mod series;

pub use counters::Counters;
pub use series::{Sample, SlidingWindowSeries};
