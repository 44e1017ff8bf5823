//! In-memory surface that records what was painted.

use super::{Color, LineStyle, Surface, TextMeasurer, TextStyle};
use crate::geom::{ScreenPoint, ScreenRect};

/// Glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.6;

/// A painted operation, as seen by a [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// A filled rectangle.
    FillRect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Fill color.
        color: Color,
        /// Active clip, if any.
        clip: Option<ScreenRect>,
    },
    /// A stroked polyline.
    Polyline {
        /// Vertices.
        points: Vec<ScreenPoint>,
        /// Stroke styling.
        style: LineStyle,
        /// Active clip, if any.
        clip: Option<ScreenRect>,
    },
    /// A text run.
    Text {
        /// Text content.
        text: String,
        /// Left edge and vertical middle.
        position: ScreenPoint,
        /// Text styling.
        style: TextStyle,
    },
}

/// A surface without a display.
///
/// Text is measured with a fixed advance per character, so layouts are
/// reproducible across machines.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: f32,
    height: f32,
    scale: (f32, f32),
    clips: Vec<ScreenRect>,
    ops: Vec<PaintOp>,
}

impl HeadlessSurface {
    /// Create a surface of the given CSS size at scale 1.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale: (1.0, 1.0),
            clips: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Set the device pixel ratio on both axes.
    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale = (scale_x, scale_y);
        self
    }

    /// Change the CSS size, as a host would on resize.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Operations painted so far.
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Forget painted operations.
    pub fn reset(&mut self) {
        self.ops.clear();
        self.clips.clear();
    }

    /// Texts painted so far, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of clips still open.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }
}

impl TextMeasurer for HeadlessSurface {
    fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * GLYPH_ADVANCE
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn scale(&self) -> (f32, f32) {
        self.scale
    }

    fn push_clip(&mut self, rect: ScreenRect) {
        self.clips.push(rect);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        self.ops.push(PaintOp::FillRect {
            rect,
            color,
            clip: self.clips.last().copied(),
        });
    }

    fn stroke_polyline(&mut self, points: &[ScreenPoint], style: LineStyle) {
        self.ops.push(PaintOp::Polyline {
            points: points.to_vec(),
            style,
            clip: self.clips.last().copied(),
        });
    }

    fn fill_text(&mut self, text: &str, position: ScreenPoint, style: &TextStyle) {
        self.ops.push(PaintOp::Text {
            text: text.to_string(),
            position,
            style: *style,
        });
    }
}
