//! Numeric ranges used for data extrema and projection.

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// A range covering a single value.
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether the range has positive span and finite bounds.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.span() > 0.0
    }

    /// Check whether a value lies within the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Expand the range to include a value.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_swaps_inverted_bounds() {
        let range = Range::new(5.0, 2.0);
        assert_eq!(range.min, 2.0);
        assert_eq!(range.max, 5.0);
        assert_eq!(range.span(), 3.0);
    }

    #[test]
    fn expand_ignores_non_finite() {
        let mut range = Range::point(1.0);
        range.expand_to_include(f64::NAN);
        range.expand_to_include(-3.0);
        range.expand_to_include(f64::INFINITY);
        assert_eq!(range, Range::new(-3.0, 1.0));
        assert!(range.is_valid());
        assert!(!Range::point(2.0).is_valid());
    }
}
