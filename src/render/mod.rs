//! Rendering primitives and the drawing-surface boundary.
//!
//! A frame is first described as a [`RenderList`] of backend-agnostic
//! commands, then painted onto anything implementing [`Surface`]. Keeping
//! the two apart lets layout be tested without a real canvas.

mod color;
pub(crate) mod frame;
mod headless;

pub use frame::{Frame, LegendRow};
pub use headless::{HeadlessSurface, PaintOp};

use crate::geom::{ScreenPoint, ScreenRect};

/// RGBA color.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
}

/// Line stroke styling.
///
/// The width is expressed in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Text styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Text color.
    pub color: Color,
    /// Font size in pixels.
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 14.0,
        }
    }
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Start clipping to a rectangle.
    ClipRect(ScreenRect),
    /// End the innermost clip.
    ClipEnd,
    /// Fill a rectangle.
    FillRect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Fill color.
        color: Color,
    },
    /// Stroke connected line segments through the points, in order.
    Polyline {
        /// Vertices, already snapped to the device pixel grid.
        points: Vec<ScreenPoint>,
        /// Stroke styling.
        style: LineStyle,
    },
    /// Draw text.
    Text {
        /// Left edge and vertical middle of the text.
        position: ScreenPoint,
        /// Text content.
        text: String,
        /// Text styling.
        style: TextStyle,
    },
}

/// Aggregated render commands for one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Access all render commands.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Replay every command onto a surface.
    pub fn paint(&self, surface: &mut dyn Surface) {
        for command in &self.commands {
            match command {
                RenderCommand::ClipRect(rect) => surface.push_clip(*rect),
                RenderCommand::ClipEnd => surface.pop_clip(),
                RenderCommand::FillRect { rect, color } => surface.fill_rect(*rect, *color),
                RenderCommand::Polyline { points, style } => {
                    if points.len() >= 2 {
                        surface.stroke_polyline(points, *style);
                    }
                }
                RenderCommand::Text {
                    position,
                    text,
                    style,
                } => {
                    if !text.is_empty() {
                        surface.fill_text(text, *position, style);
                    }
                }
            }
        }
    }
}

/// Measures rendered text width.
pub trait TextMeasurer {
    /// Width in CSS pixels of `text` at the given font size.
    fn measure_text(&self, text: &str, size: f32) -> f32;
}

/// A 2D drawing surface with device-pixel scaling.
///
/// Coordinates passed in are CSS pixels; `scale` reports how many device
/// pixels one CSS pixel covers on each axis.
pub trait Surface: TextMeasurer {
    /// Surface size in CSS pixels.
    fn size(&self) -> (f32, f32);

    /// Device pixels per CSS pixel on the X and Y axis.
    fn scale(&self) -> (f32, f32);

    /// Restrict drawing to a rectangle until the matching [`Surface::pop_clip`].
    fn push_clip(&mut self, rect: ScreenRect);

    /// Drop the innermost clip.
    fn pop_clip(&mut self);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: ScreenRect, color: Color);

    /// Stroke a polyline through at least two points.
    fn stroke_polyline(&mut self, points: &[ScreenPoint], style: LineStyle);

    /// Draw text with its left edge and vertical middle at `position`.
    fn fill_text(&mut self, text: &str, position: ScreenPoint, style: &TextStyle);
}
