//! Geometric primitives used by the drawing pipeline.
//!
//! All coordinates are CSS (logical) pixels. Device pixels only appear where
//! strokes are snapped to the pixel grid, see [`crate::transform::align_coord`].

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// X value in pixels, growing to the right.
    pub x: f32,
    /// Y value in pixels, growing downwards.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset the point by a delta.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub const fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from its origin and size.
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(ScreenPoint::new(x, y), ScreenPoint::new(x + width, y + height))
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Check whether a point lies inside the rectangle (edges included).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_origin_size() {
        let rect = ScreenRect::from_origin_size(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.width(), 30.0);
        assert_eq!(rect.height(), 40.0);
        assert!(rect.is_valid());
        assert!(rect.contains(ScreenPoint::new(10.0, 60.0)));
        assert!(!rect.contains(ScreenPoint::new(41.0, 30.0)));
    }

    #[test]
    fn negative_size_is_invalid() {
        let rect = ScreenRect::from_origin_size(0.0, 0.0, -1.0, 5.0);
        assert!(!rect.is_valid());
    }
}
