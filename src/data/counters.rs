//! Latest-known counter values per metric.
//!
//! The broker reports monotonically non-decreasing counters. This state
//! object is owned by the [`App`](crate::app::App) and mutated only by the
//! decode-and-apply step; the render tick reads it on the same thread, so no
//! lock is needed.

use std::collections::BTreeMap;

use crate::decode::Envelope;

/// Latest-known value for each metric.
///
/// A decrease between envelopes is tolerated here (the value is simply
/// replaced); the rate derivation in
/// [`SlidingWindowSeries`](crate::data::SlidingWindowSeries) clamps the
/// resulting delta to zero.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    values: BTreeMap<String, u64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded envelope. Metrics absent from the envelope are left
    /// unchanged - an envelope is a partial update, not a snapshot.
    pub fn apply(&mut self, envelope: &Envelope) {
        for (name, value) in &envelope.values {
            self.values.insert(name.clone(), *value);
        }
    }

    /// Current value of a metric, zero if never reported.
    pub fn get(&self, metric: &str) -> u64 {
        self.values.get(metric).copied().unwrap_or(0)
    }

    /// Whether the metric has been reported at least once.
    pub fn seen(&self, metric: &str) -> bool {
        self.values.contains_key(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn recognized() -> Vec<String> {
        vec!["uptime".to_string(), "commits".to_string()]
    }

    #[test]
    fn test_apply_partial_update_leaves_others_unchanged() {
        let mut counters = Counters::new();
        counters.apply(&decode(r#"{"uptime": 10, "commits": 3}"#, &recognized()).unwrap());

        counters.apply(&decode(r#"{"uptime": 11}"#, &recognized()).unwrap());
        assert_eq!(counters.get("uptime"), 11);
        assert_eq!(counters.get("commits"), 3);
    }

    #[test]
    fn test_unreported_metric_reads_zero() {
        let counters = Counters::new();
        assert_eq!(counters.get("commits"), 0);
        assert!(!counters.seen("commits"));
    }

    #[test]
    fn test_decrease_is_recorded_not_rejected() {
        let mut counters = Counters::new();
        counters.apply(&decode(r#"{"commits": 9}"#, &recognized()).unwrap());
        counters.apply(&decode(r#"{"commits": 2}"#, &recognized()).unwrap());
        // Tolerated here; the series clamps the derived rate instead
        assert_eq!(counters.get("commits"), 2);
    }
}
