//! Frame decoding: raw JSON text into partial metric updates.
//!
//! A frame is a JSON object whose keys are metric names and whose values are
//! cumulative counters, e.g. `{ "commits": 5 }`. An envelope is a partial
//! update: metrics absent from the frame simply keep their last value.
//! Decoding never panics and a failure never closes the channel - the caller
//! drops the frame and keeps reading.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Metric channels the broker serves by default.
pub const DEFAULT_METRICS: &[&str] = &["uptime", "commits"];

/// Why a frame could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    /// A recognized metric carried something other than a non-negative
    /// integer.
    #[error("metric {0:?} has a non-counter value")]
    BadValue(String),

    #[error("frame carries no recognized metric")]
    Empty,
}

/// One decoded partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub values: BTreeMap<String, u64>,
}

/// Decode one raw frame against the set of recognized metric names.
///
/// Unrecognized keys are ignored; a recognized key with a value that is not
/// a non-negative integer fails the whole frame.
pub fn decode(raw: &str, recognized: &[String]) -> Result<Envelope, DecodeError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let Some(object) = parsed.as_object() else {
        return Err(DecodeError::NotAnObject);
    };

    let mut values = BTreeMap::new();
    for (key, value) in object {
        if !recognized.iter().any(|name| name == key) {
            continue;
        }
        match value.as_u64() {
            Some(counter) => {
                values.insert(key.clone(), counter);
            }
            None => return Err(DecodeError::BadValue(key.clone())),
        }
    }

    if values.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(Envelope { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognized() -> Vec<String> {
        DEFAULT_METRICS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_metric_frame() {
        let envelope = decode(r#"{ "commits": 5 }"#, &recognized()).unwrap();
        assert_eq!(envelope.values.get("commits"), Some(&5));
        assert_eq!(envelope.values.len(), 1);
    }

    #[test]
    fn test_partial_update_carries_only_present_metrics() {
        let envelope = decode(r#"{"uptime": 120, "commits": 3}"#, &recognized()).unwrap();
        assert_eq!(envelope.values.get("uptime"), Some(&120));
        assert_eq!(envelope.values.get("commits"), Some(&3));

        let envelope = decode(r#"{"uptime": 121}"#, &recognized()).unwrap();
        assert!(!envelope.values.contains_key("commits"));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = decode("{not json", &recognized()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_non_object_is_rejected() {
        for raw in ["[1, 2, 3]", "42", r#""commits""#, "null"] {
            let err = decode(raw, &recognized()).unwrap_err();
            assert!(matches!(err, DecodeError::NotAnObject), "payload {raw}");
        }
    }

    #[test]
    fn test_non_integer_value_is_rejected() {
        let err = decode(r#"{"commits": "five"}"#, &recognized()).unwrap_err();
        assert!(matches!(err, DecodeError::BadValue(name) if name == "commits"));

        let err = decode(r#"{"commits": 1.5}"#, &recognized()).unwrap_err();
        assert!(matches!(err, DecodeError::BadValue(_)));
    }

    #[test]
    fn test_negative_counter_is_rejected() {
        let err = decode(r#"{"uptime": -1}"#, &recognized()).unwrap_err();
        assert!(matches!(err, DecodeError::BadValue(name) if name == "uptime"));
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let envelope =
            decode(r#"{"commits": 2, "sessions": 9}"#, &recognized()).unwrap();
        assert_eq!(envelope.values.get("commits"), Some(&2));
        assert!(!envelope.values.contains_key("sessions"));
    }

    #[test]
    fn test_frame_with_no_recognized_metric_is_empty() {
        let err = decode(r#"{"sessions": 9}"#, &recognized()).unwrap_err();
        assert!(matches!(err, DecodeError::Empty));

        let err = decode("{}", &recognized()).unwrap_err();
        assert!(matches!(err, DecodeError::Empty));
    }
}
