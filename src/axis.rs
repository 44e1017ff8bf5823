//! Value-axis scaling and tick formatting.
//!
//! Auto-scaled axes use the classic "nice numbers" algorithm: the tick
//! spacing is always 1, 2 or 5 times a power of ten, and the bounds are
//! whole multiples of the spacing.

use crate::error::GraphError;
use crate::view::Range;

/// Extrema closer than this are treated as flat data.
const FLAT_EPSILON: f64 = 1e-6;
/// Highest number of decimals a tick label may show.
const MAX_DECIMALS: i32 = 20;
/// Most ticks an axis may ask for.
pub const MAX_TICKS: usize = 100;
/// Most ticks an axis yields. Nice rounding can overshoot the requested
/// count, so this sits above [`MAX_TICKS`].
const TICK_LIMIT: usize = 4 * MAX_TICKS;
/// Largest magnitude auto-scaling works with; the nice bounds of anything
/// within it, and their span, stay finite.
const MAX_EXTREMUM: f64 = f64::MAX / 8.0;
/// Smallest span auto-scaling resolves, relative to the data magnitude.
const RELATIVE_RESOLUTION: f64 = 1e-9;

/// A computed value axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    /// Lowest value on the axis.
    pub min: f64,
    /// Highest value on the axis.
    pub max: f64,
    /// Distance between adjacent ticks.
    pub spacing: f64,
}

impl Axis {
    /// Axis bounds as a range.
    pub fn range(&self) -> Range {
        Range::new(self.min, self.max)
    }

    /// Tick values from `min` to `max`, inclusive.
    pub fn ticks(&self) -> Vec<f64> {
        if !(self.spacing > 0.0) || !self.range().is_valid() {
            return vec![self.min, self.max];
        }
        let steps = ((self.max - self.min) / self.spacing + 1e-9).floor();
        let count = if steps.is_finite() {
            (steps as usize).saturating_add(1).min(TICK_LIMIT)
        } else {
            2
        };
        (0..count.max(2))
            .map(|index| {
                let value = self.min + index as f64 * self.spacing;
                // Accumulated error would otherwise print as "-0.0" or "1e-17".
                if value.abs() < self.spacing * 1e-9 { 0.0 } else { value }
            })
            .collect()
    }

    /// Formatted tick labels, one per entry of [`Axis::ticks`].
    pub fn tick_labels(&self) -> Vec<String> {
        self.ticks()
            .into_iter()
            .map(|value| format_tick(value, self.spacing))
            .collect()
    }
}

/// How the value axis is chosen each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisMode {
    /// Derive bounds from the buffered data.
    #[default]
    Auto,
    /// Caller-supplied bounds.
    Fixed {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Number of ticks, including both bounds.
        tick_count: usize,
    },
}

impl AxisMode {
    /// Check that a fixed range is usable.
    pub fn validate(&self) -> Result<(), GraphError> {
        match *self {
            Self::Auto => Ok(()),
            Self::Fixed {
                min,
                max,
                tick_count,
            } => {
                if !min.is_finite() || !max.is_finite() || min >= max {
                    return Err(GraphError::InvalidAxisRange { min, max });
                }
                if !(2..=MAX_TICKS).contains(&tick_count) {
                    return Err(GraphError::InvalidTickCount(tick_count));
                }
                Ok(())
            }
        }
    }

    /// Resolve the axis for the given data extrema.
    ///
    /// `data` is `None` when nothing is buffered.
    pub fn resolve(&self, data: Option<Range>, max_ticks: usize) -> Axis {
        match *self {
            Self::Auto => {
                let range = data.unwrap_or(Range::point(0.0));
                auto_axis(range.min, range.max, max_ticks)
            }
            Self::Fixed {
                min,
                max,
                tick_count,
            } => Axis {
                min,
                max,
                spacing: (max - min) / (tick_count.clamp(2, MAX_TICKS) - 1) as f64,
            },
        }
    }
}

/// Round `value` to a nice number: 1, 2, 5 or 10 times a power of ten.
///
/// With `round` the mantissa goes to the nearest nice value, otherwise to
/// the smallest nice value not below it.
pub fn nice_num(value: f64, round: bool) -> f64 {
    let exponent = value.log10().floor();
    let magnitude = 10_f64.powf(exponent);
    let fraction = value / magnitude;
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Compute a nice axis covering `[min, max]` with at most about `max_ticks` ticks.
///
/// Flat data (extrema within 1e-6) is padded by one unit each way so the
/// axis always has positive height. Above 1e9 in magnitude both the
/// flatness threshold and the padding scale with the data, so tick
/// positions stay above the float resolution. Extrema beyond
/// `f64::MAX / 8` are clamped so the bounds and their span stay finite.
pub fn auto_axis(min: f64, max: f64, max_ticks: usize) -> Axis {
    let (min, max) = if min.is_finite() && max.is_finite() {
        (
            min.min(max).clamp(-MAX_EXTREMUM, MAX_EXTREMUM),
            min.max(max).clamp(-MAX_EXTREMUM, MAX_EXTREMUM),
        )
    } else {
        (0.0, 0.0)
    };
    let magnitude = min.abs().max(max.abs());
    let (min, max) = if max - min < FLAT_EPSILON.max(magnitude * RELATIVE_RESOLUTION) {
        let pad = 1.0_f64.max(magnitude * RELATIVE_RESOLUTION);
        (min - pad, max + pad)
    } else {
        (min, max)
    };
    let max_ticks = max_ticks.clamp(2, MAX_TICKS);

    let range = nice_num(max - min, false);
    let spacing = nice_num(range / (max_ticks - 1) as f64, true);
    Axis {
        min: (min / spacing).floor() * spacing,
        max: ((max / spacing).floor() + 1.0) * spacing,
        spacing,
    }
}

/// Format a tick value with as many decimals as the tick spacing needs.
///
/// Zero always prints as `"0"`.
pub fn format_tick(value: f64, spacing: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let mut delta = spacing;
    if delta.abs() > 1.0 && value != value.floor() {
        delta = value - value.floor();
    }
    let decimals = if delta != 0.0 && delta.is_finite() {
        (-delta.abs().log10().floor() as i32).clamp(0, MAX_DECIMALS)
    } else {
        0
    };
    format!("{value:.0$}", decimals as usize)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn nice_num_picks_round_mantissas() {
        assert!(approx(nice_num(2.0, false), 2.0));
        assert!(approx(nice_num(2.1, false), 5.0));
        assert!(approx(nice_num(7.5, false), 10.0));
        assert!(approx(nice_num(0.333, true), 0.5));
        assert!(approx(nice_num(140.0, true), 100.0));
        assert!(approx(nice_num(2500.0, true), 2000.0));
    }

    #[test]
    fn flat_data_gets_padded() {
        let axis = auto_axis(1.0, 1.0, 7);
        assert!(approx(axis.min, 0.0));
        assert!(approx(axis.max, 2.5));
        assert!(approx(axis.spacing, 0.5));
        assert!(axis.min < axis.max);
    }

    #[test]
    fn axis_covers_data() {
        let axis = auto_axis(-3.2, 47.9, 7);
        assert!(approx(axis.spacing, 20.0));
        assert!(approx(axis.min, -20.0));
        assert!(approx(axis.max, 60.0));
    }

    #[test]
    fn non_finite_extrema_fall_back() {
        let axis = auto_axis(f64::NAN, 3.0, 7);
        assert!(axis.range().is_valid());
        assert!(axis.min <= -1.0 && axis.max >= 1.0);
    }

    #[test]
    fn ticks_land_on_spacing() {
        let axis = Axis {
            min: -0.5,
            max: 1.0,
            spacing: 0.5,
        };
        assert_eq!(axis.ticks(), vec![-0.5, 0.0, 0.5, 1.0]);
        assert_eq!(axis.tick_labels(), vec!["-0.5", "0", "0.5", "1.0"]);
    }

    #[test]
    fn label_precision_follows_spacing() {
        assert_eq!(format_tick(150.0, 50.0), "150");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(2.5, 2.0), "2.5");
        assert_eq!(format_tick(0.0, 0.001), "0");
        assert_eq!(format_tick(-0.0, 0.5), "0");
        assert_eq!(format_tick(1e-25, 1e-25), format!("{:.20}", 1e-25));
    }

    #[test]
    fn fixed_mode_rejects_inverted_range() {
        let mode = AxisMode::Fixed {
            min: 5.0,
            max: 2.0,
            tick_count: 4,
        };
        assert!(matches!(
            mode.validate(),
            Err(GraphError::InvalidAxisRange { .. })
        ));
        let mode = AxisMode::Fixed {
            min: 0.0,
            max: 2.0,
            tick_count: 1,
        };
        assert!(matches!(mode.validate(), Err(GraphError::InvalidTickCount(1))));
    }

    #[test]
    fn fixed_mode_spacing_splits_range() {
        let mode = AxisMode::Fixed {
            min: 0.0,
            max: 3.0,
            tick_count: 4,
        };
        let axis = mode.resolve(Some(Range::new(-100.0, 100.0)), 7);
        assert_eq!(axis.spacing, 1.0);
        assert_eq!(axis.ticks(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn auto_mode_without_data_is_non_degenerate() {
        let axis = AxisMode::Auto.resolve(None, 7);
        assert!(axis.min < axis.max);
        assert!(axis.min <= -1.0 && axis.max >= 1.0);
    }

    #[test]
    fn oversized_tick_counts_are_rejected() {
        let mode = AxisMode::Fixed {
            min: 0.0,
            max: 1.0,
            tick_count: usize::MAX,
        };
        assert!(matches!(mode.validate(), Err(GraphError::InvalidTickCount(usize::MAX))));
        let largest = AxisMode::Fixed {
            min: 0.0,
            max: 1.0,
            tick_count: MAX_TICKS,
        };
        assert!(largest.validate().is_ok());
        assert_eq!(largest.resolve(None, 7).ticks().len(), MAX_TICKS);
        // Resolving without validation still yields a bounded axis.
        assert_eq!(mode.resolve(None, 7).ticks().len(), MAX_TICKS);
    }

    #[test]
    fn tick_list_is_bounded() {
        let axis = Axis {
            min: 0.0,
            max: 1.0,
            spacing: 1e-300,
        };
        assert_eq!(axis.ticks().len(), TICK_LIMIT);

        // Rounding may overshoot the requested count; the top tick survives.
        let axis = auto_axis(0.0, 1.0, usize::MAX);
        let ticks = axis.ticks();
        assert!(ticks.len() > MAX_TICKS && ticks.len() <= TICK_LIMIT);
        assert!(approx(*ticks.last().unwrap(), axis.max));
    }

    #[test]
    fn extreme_extrema_keep_a_finite_axis() {
        let axis = auto_axis(-1e308, 1e308, 7);
        assert!(axis.min.is_finite() && axis.max.is_finite());
        assert!(axis.min < axis.max);
        assert!((axis.max - axis.min).is_finite());

        let flat = auto_axis(1e300, 1e300, 7);
        assert!(flat.min < 1e300 && flat.max > 1e300);
        assert!(flat.spacing.is_finite() && flat.spacing > 0.0);

        // A span below the float resolution at this magnitude counts as flat.
        let narrow = auto_axis(1e15, 1e15 + 0.25, 7);
        assert!(narrow.min < 1e15 && narrow.max > 1e15 + 0.25);
        assert!(narrow.ticks().len() >= 2);
    }

    proptest! {
        #[test]
        fn nice_num_is_a_nice_mantissa(value in 1e-6..1e9_f64, round in any::<bool>()) {
            let nice = nice_num(value, round);
            let mantissa = nice / 10_f64.powf(nice.log10().floor());
            prop_assert!([1.0, 2.0, 5.0, 10.0].iter().any(|candidate| approx(mantissa, *candidate)));
            if !round {
                prop_assert!(nice >= value * (1.0 - 1e-12));
            }
            prop_assert!(nice <= value * 10.0 && nice >= value / 10.0);
        }

        #[test]
        fn auto_axis_covers_the_data(
            low in -1e6..1e6_f64,
            span in 0.0..1e6_f64,
            max_ticks in 2_usize..12,
        ) {
            let high = low + span;
            let axis = auto_axis(low, high, max_ticks);
            prop_assert!(axis.spacing > 0.0);
            prop_assert!(axis.min <= low + low.abs().max(1.0) * 1e-9);
            prop_assert!(axis.max > high);
            prop_assert!(axis.min < axis.max);
        }

        #[test]
        fn auto_axis_stays_finite_for_any_extrema(
            a in any::<f64>().prop_filter("finite", |value| value.is_finite()),
            b in any::<f64>().prop_filter("finite", |value| value.is_finite()),
            max_ticks in 0_usize..1000,
        ) {
            let axis = auto_axis(a, b, max_ticks);
            prop_assert!(axis.min.is_finite() && axis.max.is_finite());
            prop_assert!((axis.max - axis.min).is_finite());
            prop_assert!(axis.spacing > 0.0 && axis.spacing.is_finite());
            prop_assert!(axis.min < axis.max);
            let ticks = axis.ticks();
            prop_assert!(ticks.len() >= 2 && ticks.len() <= TICK_LIMIT);
            prop_assert!(ticks.iter().all(|tick| tick.is_finite()));
        }
    }
}
