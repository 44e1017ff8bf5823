use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, TextRun, Window,
    font, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{Color, LineStyle, Surface, TextMeasurer, TextStyle};

const FONT_FAMILY: &str = ".SystemUIFont";

/// A [`Surface`] painting into a GPUI window.
///
/// Coordinates are relative to `bounds`, the element's area in the window.
pub struct GpuiSurface<'a> {
    window: &'a mut Window,
    cx: &'a mut App,
    bounds: Bounds<Pixels>,
    clips: Vec<ContentMask<Pixels>>,
}

impl<'a> GpuiSurface<'a> {
    /// Wrap a window for one paint pass over `bounds`.
    pub fn new(window: &'a mut Window, cx: &'a mut App, bounds: Bounds<Pixels>) -> Self {
        Self {
            window,
            cx,
            bounds,
            clips: Vec::new(),
        }
    }

    fn to_window(&self, pt: ScreenPoint) -> gpui::Point<Pixels> {
        point(
            self.bounds.origin.x + px(pt.x),
            self.bounds.origin.y + px(pt.y),
        )
    }

    fn to_bounds(&self, rect: ScreenRect) -> Bounds<Pixels> {
        Bounds::from_corners(self.to_window(rect.min), self.to_window(rect.max))
    }

    fn with_clip(&mut self, f: impl FnOnce(&mut Window, &mut App)) {
        let cx = &mut *self.cx;
        match self.clips.last() {
            Some(mask) => self
                .window
                .with_content_mask(Some(mask.clone()), |window| f(window, cx)),
            None => f(&mut *self.window, cx),
        }
    }
}

impl TextMeasurer for GpuiSurface<'_> {
    fn measure_text(&self, text: &str, size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let shaped = self.window.text_system().shape_line(
            text.to_string().into(),
            px(size),
            &[text_run(text, Color::BLACK)],
            None,
        );
        f32::from(shaped.width)
    }
}

impl Surface for GpuiSurface<'_> {
    fn size(&self) -> (f32, f32) {
        (
            f32::from(self.bounds.size.width),
            f32::from(self.bounds.size.height),
        )
    }

    fn scale(&self) -> (f32, f32) {
        let scale = self.window.scale_factor();
        (scale, scale)
    }

    fn push_clip(&mut self, rect: ScreenRect) {
        let bounds = self.to_bounds(rect);
        self.clips.push(ContentMask { bounds });
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        let bounds = self.to_bounds(rect);
        self.with_clip(|window, _| {
            window.paint_quad(quad(
                bounds,
                Corners::all(px(0.0)),
                to_rgba(color),
                Edges::all(px(0.0)),
                to_rgba(color),
                BorderStyle::default(),
            ));
        });
    }

    fn stroke_polyline(&mut self, points: &[ScreenPoint], style: LineStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut builder = PathBuilder::stroke(px(style.width.max(0.5)));
        builder.move_to(self.to_window(*first));
        for pt in rest {
            builder.line_to(self.to_window(*pt));
        }
        if let Ok(path) = builder.build() {
            self.with_clip(|window, _| window.paint_path(path, to_rgba(style.color)));
        }
    }

    fn fill_text(&mut self, text: &str, position: ScreenPoint, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let shaped = self.window.text_system().shape_line(
            text.to_string().into(),
            px(style.size),
            &[text_run(text, style.color)],
            None,
        );
        let line_height = shaped.ascent + shaped.descent;
        // Frames place text by its vertical middle; GPUI paints from the top.
        let origin = self.to_window(position) - point(px(0.0), line_height / 2.0);
        self.with_clip(|window, cx| {
            let _ = shaped.paint(origin, line_height, window, cx);
        });
    }
}

fn text_run(text: &str, color: Color) -> TextRun {
    TextRun {
        len: text.len(),
        font: font(FONT_FAMILY),
        color: to_hsla(color),
        background_color: None,
        underline: None,
        strikethrough: None,
    }
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}
