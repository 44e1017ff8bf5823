//! Graph configuration.
//!
//! Option names follow the dashboard's JSON spelling, so a configuration
//! blob such as `{"windowMs": 10000, "colors": ["#2979ff"]}` deserializes
//! directly. Every field has a default and any subset may be supplied.

use serde::{Deserialize, Serialize};

use crate::axis::MAX_TICKS;
use crate::error::GraphError;
use crate::render::Color;

/// Default visible time span.
pub const DEFAULT_WINDOW_MS: f64 = 5000.0;
/// Default rendering delay.
pub const DEFAULT_DELAY_MS: f64 = 250.0;

/// Visual and timing options of a graph.
///
/// Dimensions are CSS pixels unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
    /// Visible and buffered time span in milliseconds.
    pub window_ms: f64,
    /// Offset between "now" and the rightmost rendered time, in milliseconds.
    pub delay_ms: f64,
    /// Series palette, assigned round-robin.
    pub colors: Vec<Color>,
    /// Series stroke width.
    pub line_width: f32,
    /// Padding around the plot area.
    pub padding: f32,
    /// Gap between legend rows and between swatch and label.
    pub legend_spacing: f32,
    /// Length of the legend color swatch.
    pub legend_line_length: f32,
    /// Grid stroke width in device pixels.
    pub grid_line_width: f32,
    /// Grid stroke color.
    pub grid_line_color: Color,
    /// Font size for legend and tick labels.
    pub font_size: f32,
    /// Legend and tick label color.
    pub text_color: Color,
    /// Surface fill color.
    pub background_color: Color,
    /// Upper bound on the number of value-axis ticks.
    pub max_ticks: usize,
    /// Number of vertical grid lines across the time axis.
    pub grid_columns: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            delay_ms: DEFAULT_DELAY_MS,
            colors: vec![
                Color::rgb8(0x29, 0x79, 0xff),
                Color::rgb8(0xdd, 0x2c, 0x00),
                Color::rgb8(0x4c, 0xaf, 0x50),
                Color::rgb8(0x7c, 0x4d, 0xff),
                Color::rgb8(0xff, 0xa0, 0x00),
            ],
            line_width: 2.0,
            padding: 15.0,
            legend_spacing: 4.0,
            legend_line_length: 12.0,
            grid_line_width: 1.0,
            grid_line_color: Color::rgb8(120, 120, 120),
            font_size: 14.0,
            text_color: Color::rgb8(50, 50, 50),
            background_color: Color::WHITE,
            max_ticks: 7,
            grid_columns: 5,
        }
    }
}

impl GraphOptions {
    /// Parse options from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Set the window span.
    pub fn with_window_ms(mut self, window_ms: f64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Set the rendering delay.
    pub fn with_delay_ms(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the series palette.
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    /// Set the tick bound.
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Check every option, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), GraphError> {
        validate_window_ms(self.window_ms)?;
        validate_delay_ms(self.delay_ms)?;
        if self.colors.is_empty() {
            return Err(GraphError::option("colors", "palette is empty"));
        }
        positive("lineWidth", self.line_width)?;
        non_negative("padding", self.padding)?;
        non_negative("legendSpacing", self.legend_spacing)?;
        non_negative("legendLineLength", self.legend_line_length)?;
        positive("gridLineWidth", self.grid_line_width)?;
        positive("fontSize", self.font_size)?;
        if !(2..=MAX_TICKS).contains(&self.max_ticks) {
            return Err(GraphError::option(
                "maxTicks",
                format!("{} is outside 2..={MAX_TICKS}", self.max_ticks),
            ));
        }
        if !(2..=MAX_TICKS).contains(&self.grid_columns) {
            return Err(GraphError::option(
                "gridColumns",
                format!("{} is outside 2..={MAX_TICKS}", self.grid_columns),
            ));
        }
        Ok(())
    }

    /// Replace every invalid option with its default.
    ///
    /// Returns the names of the options that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut reset = Vec::new();
        if validate_window_ms(self.window_ms).is_err() {
            self.window_ms = defaults.window_ms;
            reset.push("windowMs");
        }
        if validate_delay_ms(self.delay_ms).is_err() {
            self.delay_ms = defaults.delay_ms;
            reset.push("delayMs");
        }
        if self.colors.is_empty() {
            self.colors = defaults.colors.clone();
            reset.push("colors");
        }
        let sizes: [(&'static str, &mut f32, f32, bool); 6] = [
            ("lineWidth", &mut self.line_width, defaults.line_width, true),
            ("padding", &mut self.padding, defaults.padding, false),
            ("legendSpacing", &mut self.legend_spacing, defaults.legend_spacing, false),
            (
                "legendLineLength",
                &mut self.legend_line_length,
                defaults.legend_line_length,
                false,
            ),
            ("gridLineWidth", &mut self.grid_line_width, defaults.grid_line_width, true),
            ("fontSize", &mut self.font_size, defaults.font_size, true),
        ];
        for (name, value, default, strict) in sizes {
            let check = if strict {
                positive(name, *value)
            } else {
                non_negative(name, *value)
            };
            if check.is_err() {
                *value = default;
                reset.push(name);
            }
        }
        if !(2..=MAX_TICKS).contains(&self.max_ticks) {
            self.max_ticks = defaults.max_ticks;
            reset.push("maxTicks");
        }
        if !(2..=MAX_TICKS).contains(&self.grid_columns) {
            self.grid_columns = defaults.grid_columns;
            reset.push("gridColumns");
        }
        reset
    }
}

pub(crate) fn validate_window_ms(window_ms: f64) -> Result<(), GraphError> {
    if window_ms.is_finite() && window_ms > 0.0 {
        Ok(())
    } else {
        Err(GraphError::option(
            "windowMs",
            format!("{window_ms} is not a positive finite duration"),
        ))
    }
}

pub(crate) fn validate_delay_ms(delay_ms: f64) -> Result<(), GraphError> {
    if delay_ms.is_finite() && delay_ms >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::option(
            "delayMs",
            format!("{delay_ms} is not a non-negative finite duration"),
        ))
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), GraphError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GraphError::option(name, format!("{value} must be positive")))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), GraphError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::option(name, format!("{value} must not be negative")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = GraphOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.colors.len(), 5);
        assert_eq!(options.max_ticks, 7);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let options =
            GraphOptions::from_json(r##"{"windowMs": 10000, "colors": ["#000", "rgb(255,0,0)"]}"##)
                .unwrap();
        assert_eq!(options.window_ms, 10000.0);
        assert_eq!(options.delay_ms, DEFAULT_DELAY_MS);
        assert_eq!(options.colors, vec![Color::BLACK, Color::rgb8(255, 0, 0)]);
        assert_eq!(options.font_size, 14.0);
    }

    #[test]
    fn invalid_json_values_are_reported() {
        let err = GraphOptions::from_json(r#"{"windowMs": -5}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOption { name: "windowMs", .. }));
        let err = GraphOptions::from_json(r#"{"colors": []}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOption { name: "colors", .. }));
        let err = GraphOptions::from_json(r#"{"maxTicks": "many"}"#).unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn huge_tick_and_column_counts_are_rejected() {
        let json = format!(r#"{{"maxTicks": {}}}"#, usize::MAX);
        let err = GraphOptions::from_json(&json).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOption { name: "maxTicks", .. }));
        let err = GraphOptions::from_json(r#"{"gridColumns": 1000000}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOption { name: "gridColumns", .. }));

        let mut options = GraphOptions {
            max_ticks: 101,
            grid_columns: usize::MAX,
            ..GraphOptions::default()
        };
        assert_eq!(options.sanitize(), vec!["maxTicks", "gridColumns"]);
        assert_eq!((options.max_ticks, options.grid_columns), (7, 5));
        assert!(GraphOptions::default().with_max_ticks(MAX_TICKS).validate().is_ok());
    }

    #[test]
    fn sanitize_resets_only_bad_fields() {
        let mut options = GraphOptions {
            window_ms: f64::NAN,
            delay_ms: 100.0,
            line_width: -1.0,
            max_ticks: 1,
            ..GraphOptions::default()
        };
        let reset = options.sanitize();
        assert_eq!(reset, vec!["windowMs", "lineWidth", "maxTicks"]);
        assert_eq!(options.window_ms, DEFAULT_WINDOW_MS);
        assert_eq!(options.delay_ms, 100.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let json = serde_json::to_value(GraphOptions::default()).unwrap();
        assert_eq!(json["windowMs"], 5000.0);
        assert_eq!(json["gridLineColor"], "#787878");
        assert_eq!(json["colors"][0], "#2979ff");
    }
}
