//! Adapter from raw telemetry packets to graph samples.
//!
//! The controller sends every value as a string. Keys are catalogued in the
//! order they first appear; only keys the user selected are graphed, and
//! values are parsed leniently: leading numeric text counts, so `"12.5 V"`
//! reads as 12.5.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;
use crate::sample::Sample;

/// One telemetry packet as received from the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPacket {
    /// Controller timestamp in milliseconds.
    pub timestamp: f64,
    /// Key/value readings, in the order the controller sent them.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Free-form log lines.
    #[serde(default)]
    pub log: Vec<String>,
}

impl TelemetryPacket {
    /// Parse a JSON array of packets.
    pub fn batch_from_json(json: &str) -> Result<Vec<Self>, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse a telemetry value as a number.
///
/// Strings are read up to the longest numeric prefix; `NaN` and values
/// without one give `None`.
pub fn parse_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_leading_number(text),
        _ => None,
    }?;
    (!number.is_nan()).then_some(number)
}

fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    if let Ok(number) = text.parse::<f64>() {
        return Some(number);
    }
    // Longest numeric prefix, e.g. "3.5e2ms" -> 350.
    let prefix = numeric_prefix(text);
    if prefix.is_empty() {
        return None;
    }
    prefix.parse::<f64>().ok()
}

/// Leading `[+-]digits[.digits][(e|E)[+-]digits]`, scanned once.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits_from(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return "";
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let digits = digits_from(exponent);
        if digits > 0 {
            end = exponent + digits;
        }
    }
    &text[..end]
}

/// What a catalogued key is known to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    /// Telemetry key.
    pub key: String,
    /// Whether any value seen so far parsed as a number.
    pub has_numeric: bool,
    /// Whether the key is graphed.
    pub selected: bool,
}

/// Whether a catalog has anything to graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    /// No keys yet, or some key never carried a number.
    NoNumericData,
    /// Numeric keys exist but none is selected.
    NothingSelected,
    /// At least one key is selected for graphing.
    Ready,
}

/// Every telemetry key seen, in first-seen order, with its selection.
#[derive(Debug, Clone, Default)]
pub struct KeyCatalog {
    keys: Vec<KeyInfo>,
}

impl KeyCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the keys and value kinds of a packet.
    pub fn observe(&mut self, packet: &TelemetryPacket) {
        for (key, value) in &packet.data {
            let numeric = parse_value(value).is_some();
            match self.keys.iter_mut().find(|info| info.key == *key) {
                Some(info) => info.has_numeric |= numeric,
                None => {
                    debug!("telemetry key `{key}` discovered");
                    self.keys.push(KeyInfo {
                        key: key.clone(),
                        has_numeric: numeric,
                        selected: false,
                    });
                }
            }
        }
    }

    /// Select or deselect a key for graphing.
    ///
    /// Returns false when the key has not been seen.
    pub fn set_selected(&mut self, key: &str, selected: bool) -> bool {
        match self.keys.iter_mut().find(|info| info.key == key) {
            Some(info) => {
                info.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Check whether a key is graphed.
    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.iter().any(|info| info.selected && info.key == key)
    }

    /// Catalogued keys in first-seen order.
    pub fn keys(&self) -> &[KeyInfo] {
        &self.keys
    }

    /// Selected keys in first-seen order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .filter(|info| info.selected)
            .map(|info| info.key.clone())
            .collect()
    }

    /// Whether the catalog has anything to graph.
    pub fn status(&self) -> CatalogStatus {
        if self.keys.is_empty() || !self.keys.iter().all(|info| info.has_numeric) {
            CatalogStatus::NoNumericData
        } else if !self.keys.iter().any(|info| info.selected) {
            CatalogStatus::NothingSelected
        } else {
            CatalogStatus::Ready
        }
    }

    /// Forget every key and selection, as at the start of a new run.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Sample holding the selected, numeric readings of a packet.
    pub fn to_sample(&self, packet: &TelemetryPacket) -> Sample {
        Sample::from_pairs_lossy(
            packet.timestamp,
            packet
                .data
                .iter()
                .filter(|(key, _)| self.is_selected(key))
                .filter_map(|(key, value)| parse_value(value).map(|number| (key.as_str(), number))),
        )
    }

    /// Catalogue a batch and convert it to samples.
    pub fn ingest(&mut self, packets: &[TelemetryPacket]) -> Vec<Sample> {
        for packet in packets {
            self.observe(packet);
        }
        packets.iter().map(|packet| self.to_sample(packet)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packets() -> Vec<TelemetryPacket> {
        TelemetryPacket::batch_from_json(
            r#"[
                {"timestamp": 100, "data": {"heading": "1.5", "mode": "auto", "voltage": "12.4 V"}},
                {"timestamp": 120, "data": {"heading": "1.7", "mode": "3", "voltage": "12.3 V"}, "log": ["hi"]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn lenient_number_parsing() {
        assert_eq!(parse_value(&Value::from("12.4 V")), Some(12.4));
        assert_eq!(parse_value(&Value::from("  -3e2x")), Some(-300.0));
        assert_eq!(parse_value(&Value::from(7)), Some(7.0));
        assert_eq!(parse_value(&Value::from("auto")), None);
        assert_eq!(parse_value(&Value::from("NaN")), None);
        assert_eq!(parse_value(&Value::Bool(true)), None);
    }

    #[test]
    fn numeric_prefix_follows_float_grammar() {
        assert_eq!(parse_leading_number("3.5e2ms"), Some(350.0));
        assert_eq!(parse_leading_number("1e+"), Some(1.0));
        assert_eq!(parse_leading_number(".5s"), Some(0.5));
        assert_eq!(parse_leading_number("4.rpm"), Some(4.0));
        assert_eq!(parse_leading_number("-.x"), None);
        assert_eq!(parse_leading_number("+"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn long_values_parse_in_one_pass() {
        let padded = format!("{}7 V", "0".repeat(50_000));
        assert_eq!(parse_value(&Value::from(padded)), Some(7.0));
        let exponents = format!("1{}", "e".repeat(50_000));
        assert_eq!(parse_value(&Value::from(exponents)), Some(1.0));
        let signs = "+-".repeat(25_000);
        assert_eq!(parse_value(&Value::from(signs)), None);
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let mut catalog = KeyCatalog::new();
        for packet in &packets() {
            catalog.observe(packet);
        }
        let keys: Vec<&str> = catalog.keys().iter().map(|info| info.key.as_str()).collect();
        assert_eq!(keys, vec!["heading", "mode", "voltage"]);
        assert!(catalog.keys().iter().all(|info| info.has_numeric));
        assert_eq!(catalog.status(), CatalogStatus::NothingSelected);
    }

    #[test]
    fn only_selected_numeric_values_become_samples() {
        let mut catalog = KeyCatalog::new();
        catalog.ingest(&packets());
        assert!(catalog.set_selected("mode", true));
        assert!(catalog.set_selected("voltage", true));
        assert!(!catalog.set_selected("missing", true));
        assert_eq!(catalog.status(), CatalogStatus::Ready);

        let samples = catalog.ingest(&packets());
        assert_eq!(samples[0].data(), &[("voltage".to_string(), 12.4)]);
        assert_eq!(
            samples[1].data(),
            &[("mode".to_string(), 3.0), ("voltage".to_string(), 12.3)]
        );
        assert_eq!(samples[1].timestamp(), 120.0);
    }

    #[test]
    fn non_numeric_key_blocks_graphing() {
        let mut catalog = KeyCatalog::new();
        let packet = TelemetryPacket {
            timestamp: 1.0,
            data: [("status".to_string(), Value::from("ok"))].into_iter().collect(),
            log: Vec::new(),
        };
        catalog.observe(&packet);
        assert_eq!(catalog.status(), CatalogStatus::NoNumericData);
        catalog.clear();
        assert!(catalog.keys().is_empty());
    }
}
