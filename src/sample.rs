//! Ingestion units pushed by the telemetry source.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// One timestamped set of named numeric readings.
///
/// Keys are unique within a sample and keep the order they were given in,
/// which decides color order when several new series show up together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct Sample {
    timestamp: f64,
    data: Vec<(String, f64)>,
}

impl Sample {
    /// Create a sample, rejecting duplicate keys and non-finite timestamps.
    pub fn new<K>(timestamp: f64, data: impl IntoIterator<Item = (K, f64)>) -> Result<Self, GraphError>
    where
        K: Into<String>,
    {
        if !timestamp.is_finite() {
            return Err(GraphError::InvalidTimestamp(timestamp));
        }
        let mut pairs: Vec<(String, f64)> = Vec::new();
        for (key, value) in data {
            let key = key.into();
            if pairs.iter().any(|(existing, _)| *existing == key) {
                return Err(GraphError::DuplicateKey(key));
            }
            pairs.push((key, value));
        }
        Ok(Self {
            timestamp,
            data: pairs,
        })
    }

    /// Create a sample keeping only the first occurrence of each key.
    ///
    /// The timestamp is not checked; the buffer skips non-finite ones.
    pub fn from_pairs_lossy<K>(timestamp: f64, data: impl IntoIterator<Item = (K, f64)>) -> Self
    where
        K: Into<String>,
    {
        let mut pairs: Vec<(String, f64)> = Vec::new();
        for (key, value) in data {
            let key = key.into();
            if !pairs.iter().any(|(existing, _)| *existing == key) {
                pairs.push((key, value));
            }
        }
        Self {
            timestamp,
            data: pairs,
        }
    }

    /// Externally supplied timestamp in milliseconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// The `(key, value)` readings.
    pub fn data(&self) -> &[(String, f64)] {
        &self.data
    }

    /// Check whether the sample carries no readings.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value for a key, if present.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.data
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| *value)
    }

    /// Drop readings whose value is NaN or infinite.
    ///
    /// Returns the number of readings removed.
    pub(crate) fn retain_finite(&mut self) -> usize {
        let before = self.data.len();
        self.data.retain(|(_, value)| value.is_finite());
        before - self.data.len()
    }
}

#[derive(Deserialize)]
struct RawSample {
    timestamp: f64,
    data: Vec<(String, f64)>,
}

impl TryFrom<RawSample> for Sample {
    type Error = GraphError;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        Self::new(raw.timestamp, raw.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = Sample::new(0.0, [("x", 1.0), ("y", 2.0), ("x", 3.0)]);
        assert!(matches!(result, Err(GraphError::DuplicateKey(key)) if key == "x"));
    }

    #[test]
    fn non_finite_timestamps_are_rejected() {
        for timestamp in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = Sample::new(timestamp, [("x", 1.0)]);
            assert!(matches!(result, Err(GraphError::InvalidTimestamp(_))));
        }
        assert!(Sample::new(-5.0, [("x", 1.0)]).is_ok());
    }

    #[test]
    fn lossy_keeps_first_occurrence() {
        let sample = Sample::from_pairs_lossy(5.0, [("x", 1.0), ("x", 3.0), ("y", 2.0)]);
        assert_eq!(sample.data().len(), 2);
        assert_eq!(sample.value("x"), Some(1.0));
        assert_eq!(sample.value("y"), Some(2.0));
        assert_eq!(sample.timestamp(), 5.0);
    }

    #[test]
    fn retain_finite_drops_nan_and_infinity() {
        let mut sample =
            Sample::new(0.0, [("a", f64::NAN), ("b", 1.0), ("c", f64::INFINITY)]).unwrap();
        assert_eq!(sample.retain_finite(), 2);
        assert_eq!(sample.data(), &[("b".to_string(), 1.0)]);
    }

    #[test]
    fn deserializes_from_pair_arrays() {
        let sample: Sample =
            serde_json::from_str(r#"{"timestamp": 12, "data": [["x", 1.5], ["y", -2]]}"#).unwrap();
        assert_eq!(sample.timestamp(), 12.0);
        assert_eq!(sample.value("y"), Some(-2.0));

        let duplicate = serde_json::from_str::<Sample>(r#"{"timestamp": 0, "data": [["x", 1], ["x", 2]]}"#);
        assert!(duplicate.is_err());
    }
}
