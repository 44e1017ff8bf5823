//! Coordinate transforms between data and screen space.

use crate::geom::{ScreenPoint, ScreenRect};
use crate::view::Range;

const MIN_SPAN: f64 = 1e-12;

/// Linear projection from `(anim_timestamp, value)` into a screen rectangle.
///
/// Time maps left to right; values map bottom to top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    time: Range,
    value: Range,
    screen: ScreenRect,
}

impl Projection {
    /// Create a projection, or `None` when the screen rectangle is empty or
    /// either range is not finite.
    pub fn new(time: Range, value: Range, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() || !time.is_finite() || !value.is_finite() {
            return None;
        }
        Some(Self {
            time: with_min_span(time),
            value: with_min_span(value),
            screen,
        })
    }

    /// Time range spanning the screen width.
    pub fn time(&self) -> Range {
        self.time
    }

    /// Value range spanning the screen height.
    pub fn value(&self) -> Range {
        self.value
    }

    /// Target screen rectangle.
    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Map a data point into screen space.
    ///
    /// Points outside the ranges land outside the rectangle.
    pub fn project(&self, anim_timestamp: f64, value: f64) -> ScreenPoint {
        let x_norm = (anim_timestamp - self.time.min) / self.time.span();
        let y_norm = (value - self.value.min) / self.value.span();
        let sx = self.screen.min.x as f64 + x_norm * self.screen.width() as f64;
        let sy = self.screen.max.y as f64 - y_norm * self.screen.height() as f64;
        ScreenPoint::new(sx as f32, sy as f32)
    }

    /// Map a screen point back into `(anim_timestamp, value)`.
    pub fn unproject(&self, point: ScreenPoint) -> (f64, f64) {
        let x_norm = (point.x as f64 - self.screen.min.x as f64) / self.screen.width() as f64;
        let y_norm = (self.screen.max.y as f64 - point.y as f64) / self.screen.height() as f64;
        (
            self.time.min + x_norm * self.time.span(),
            self.value.min + y_norm * self.value.span(),
        )
    }
}

fn with_min_span(range: Range) -> Range {
    if range.span() >= MIN_SPAN {
        range
    } else {
        let center = (range.min + range.max) * 0.5;
        Range::new(center - MIN_SPAN * 0.5, center + MIN_SPAN * 0.5)
    }
}

/// Snap a CSS-pixel coordinate to the nearest device half pixel.
///
/// `scale` is device pixels per CSS pixel. A one-device-pixel stroke
/// centered on a half pixel covers exactly one pixel row instead of
/// blurring across two.
pub fn align_coord(coord: f32, scale: f32) -> f32 {
    if !(scale > 0.0) || !coord.is_finite() {
        return coord;
    }
    ((coord * scale - 0.5).round() + 0.5) / scale
}

/// Snap both coordinates of a point, one scale per axis.
pub fn align_point(point: ScreenPoint, scale: (f32, f32)) -> ScreenPoint {
    ScreenPoint::new(align_coord(point.x, scale.0), align_coord(point.y, scale.1))
}
