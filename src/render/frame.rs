//! Frame layout: legend, value-axis labels, grid and series lines.
//!
//! Layout is recomputed from scratch for every frame. The surface is split
//! top to bottom into a centred legend block and the graph; the graph
//! reserves a label column as wide as the widest tick label, and the plot
//! rectangle takes the rest minus padding.

use super::{Color, LineStyle, RenderCommand, RenderList, Surface, TextMeasurer, TextStyle};
use crate::axis::Axis;
use crate::buffer::SampleBuffer;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::options::GraphOptions;
use crate::transform::{Projection, align_point};
use crate::view::Range;

/// Everything a frame is computed from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameInput<'a> {
    pub(crate) options: &'a GraphOptions,
    pub(crate) buffer: &'a SampleBuffer,
    pub(crate) axis: Axis,
    pub(crate) now: f64,
    pub(crate) size: (f32, f32),
    pub(crate) scale: (f32, f32),
}

/// One legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    /// Series key, also the label text.
    pub key: String,
    /// Series color.
    pub color: Color,
    /// Left end of the color swatch, at the row's vertical middle.
    pub swatch: ScreenPoint,
    /// Left edge and vertical middle of the label.
    pub label: ScreenPoint,
}

/// A fully laid out frame.
///
/// Two frames built from the same buffer, time and surface compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    commands: RenderList,
    axis: Axis,
    plot_rect: ScreenRect,
    legend_rows: Vec<LegendRow>,
}

impl Frame {
    /// Draw commands in painting order.
    pub fn commands(&self) -> &RenderList {
        &self.commands
    }

    /// Value axis used for labels, grid and projection.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Area the series are drawn and clipped to.
    pub fn plot_rect(&self) -> ScreenRect {
        self.plot_rect
    }

    /// Legend entries, one per active series in registration order.
    pub fn legend_rows(&self) -> &[LegendRow] {
        &self.legend_rows
    }

    /// Paint the frame onto a surface.
    pub fn paint(&self, surface: &mut dyn Surface) {
        self.commands.paint(surface);
    }
}

/// Lay out one frame.
pub(crate) fn build_frame<M: TextMeasurer + ?Sized>(input: &FrameInput<'_>, measurer: &M) -> Frame {
    let options = input.options;
    let (width, height) = input.size;
    let mut commands = RenderList::new();

    commands.push(RenderCommand::FillRect {
        rect: ScreenRect::from_origin_size(0.0, 0.0, width, height),
        color: options.background_color,
    });

    let (legend_rows, legend_height) = push_legend(&mut commands, input, measurer);

    let text = TextStyle {
        color: options.text_color,
        size: options.font_size,
    };
    let padding = options.padding;
    let graph_top = legend_height;
    let graph_height = height - legend_height - 2.0 * padding;

    let ticks = input.axis.tick_labels();
    let axis_width = ticks
        .iter()
        .map(|label| measurer.measure_text(label, text.size))
        .fold(0.0_f32, f32::max);
    let row_step = graph_height / (ticks.len().max(2) - 1) as f32;
    let label_right = padding + axis_width;
    for (index, label) in ticks.iter().enumerate() {
        let y = graph_top + padding + (ticks.len() - index - 1) as f32 * row_step;
        commands.push(RenderCommand::Text {
            position: ScreenPoint::new(label_right - measurer.measure_text(label, text.size), y),
            text: label.clone(),
            style: text,
        });
    }

    let plot_rect = ScreenRect::from_origin_size(
        axis_width + 2.0 * padding,
        graph_top + padding,
        width - axis_width - 3.0 * padding,
        graph_height,
    );
    if plot_rect.is_valid() {
        push_grid(&mut commands, input, plot_rect, ticks.len());
        push_series(&mut commands, input, plot_rect);
    }

    Frame {
        commands,
        axis: input.axis,
        plot_rect,
        legend_rows,
    }
}

fn push_legend<M: TextMeasurer + ?Sized>(
    commands: &mut RenderList,
    input: &FrameInput<'_>,
    measurer: &M,
) -> (Vec<LegendRow>, f32) {
    let options = input.options;
    let registry = input.buffer.registry();
    let count = registry.len();
    if count == 0 {
        return (Vec::new(), 0.0);
    }

    let font_size = options.font_size;
    let block_width = registry
        .keys()
        .iter()
        .map(|key| {
            measurer.measure_text(key, font_size) + options.legend_line_length + options.legend_spacing
        })
        .fold(0.0_f32, f32::max);
    let left = (input.size.0 - block_width) / 2.0;
    let swatch_width = options.line_width / input.scale.1.max(f32::EPSILON);

    let mut rows = Vec::with_capacity(count);
    for (index, (key, meta)) in registry.iter().enumerate() {
        let y = index as f32 * (font_size + options.legend_spacing) + font_size / 2.0;
        let swatch = ScreenPoint::new(left, y);
        let label = ScreenPoint::new(left + options.legend_line_length + options.legend_spacing, y);
        commands.push(RenderCommand::Polyline {
            points: vec![
                align_point(swatch, input.scale),
                align_point(swatch.offset(options.legend_line_length, 0.0), input.scale),
            ],
            style: LineStyle {
                color: meta.color(),
                width: swatch_width,
            },
        });
        commands.push(RenderCommand::Text {
            position: label,
            text: key.to_string(),
            style: TextStyle {
                color: options.text_color,
                size: font_size,
            },
        });
        rows.push(LegendRow {
            key: key.to_string(),
            color: meta.color(),
            swatch,
            label,
        });
    }

    let height = count as f32 * font_size + (count - 1) as f32 * options.legend_spacing;
    (rows, height)
}

fn push_grid(commands: &mut RenderList, input: &FrameInput<'_>, plot: ScreenRect, rows: usize) {
    let options = input.options;
    let (scale_x, scale_y) = input.scale;
    let columns = options.grid_columns.max(2);
    let rows = rows.max(2);
    let column_step = plot.width() / (columns - 1) as f32;
    let row_step = plot.height() / (rows - 1) as f32;

    let vertical = LineStyle {
        color: options.grid_line_color,
        width: options.grid_line_width / scale_x.max(f32::EPSILON),
    };
    for index in 0..columns {
        let x = plot.min.x + column_step * index as f32;
        commands.push(RenderCommand::Polyline {
            points: vec![
                align_point(ScreenPoint::new(x, plot.min.y), input.scale),
                align_point(ScreenPoint::new(x, plot.max.y), input.scale),
            ],
            style: vertical,
        });
    }

    let horizontal = LineStyle {
        width: options.grid_line_width / scale_y.max(f32::EPSILON),
        ..vertical
    };
    for index in 0..rows {
        let y = plot.min.y + row_step * index as f32;
        commands.push(RenderCommand::Polyline {
            points: vec![
                align_point(ScreenPoint::new(plot.min.x, y), input.scale),
                align_point(ScreenPoint::new(plot.max.x, y), input.scale),
            ],
            style: horizontal,
        });
    }
}

fn push_series(commands: &mut RenderList, input: &FrameInput<'_>, plot: ScreenRect) {
    let options = input.options;
    let time = Range::new(input.now - options.window_ms, input.now);
    let Some(projection) = Projection::new(time, input.axis.range(), plot) else {
        return;
    };

    commands.push(RenderCommand::ClipRect(plot));
    for (key, meta) in input.buffer.registry().iter() {
        let points: Vec<ScreenPoint> = input
            .buffer
            .series_points(key)
            .map(|(anim_timestamp, value)| {
                align_point(projection.project(anim_timestamp, value), input.scale)
            })
            .collect();
        commands.push(RenderCommand::Polyline {
            points,
            style: LineStyle {
                color: meta.color(),
                width: options.line_width,
            },
        });
    }
    commands.push(RenderCommand::ClipEnd);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::axis::auto_axis;
    use crate::clock::ManualClock;
    use crate::render::HeadlessSurface;
    use crate::sample::Sample;
    use crate::timeline::TimeMapper;

    struct Fixture {
        options: GraphOptions,
        buffer: SampleBuffer,
        timeline: TimeMapper,
    }

    impl Fixture {
        fn new(samples: &[(f64, &[(&str, f64)])]) -> Self {
            let options = GraphOptions::default().with_delay_ms(0.0);
            let clock = ManualClock::new(0.0);
            let timeline = TimeMapper::new(Arc::new(clock), 0.0);
            let mut buffer = SampleBuffer::new(options.colors.clone());
            let batch = samples.iter().map(|(timestamp, data)| {
                Sample::new(*timestamp, data.iter().map(|(key, value)| (*key, *value))).unwrap()
            });
            buffer.add_samples(batch, &timeline, f64::INFINITY);
            Self {
                options,
                buffer,
                timeline,
            }
        }

        fn frame(&self, surface: &HeadlessSurface) -> Frame {
            let range = self.buffer.value_range().unwrap_or(Range::point(0.0));
            let input = FrameInput {
                options: &self.options,
                buffer: &self.buffer,
                axis: auto_axis(range.min, range.max, self.options.max_ticks),
                now: self.timeline.current_anim_time(),
                size: surface.size(),
                scale: surface.scale(),
            };
            build_frame(&input, surface)
        }
    }

    #[test]
    fn empty_buffer_still_lays_out_axis() {
        let fixture = Fixture::new(&[]);
        let surface = HeadlessSurface::new(400.0, 300.0);
        let frame = fixture.frame(&surface);
        assert!(frame.legend_rows().is_empty());
        assert!(frame.plot_rect().is_valid());
        assert_eq!(frame.plot_rect().min.y, 15.0);
        assert!(matches!(
            &frame.commands().commands()[0],
            RenderCommand::FillRect { color, .. } if *color == Color::WHITE
        ));
        let labels = frame
            .commands()
            .commands()
            .iter()
            .filter(|command| matches!(command, RenderCommand::Text { .. }))
            .count();
        assert_eq!(labels, frame.axis().ticks().len());
    }

    #[test]
    fn legend_rows_stack_and_centre() {
        let fixture = Fixture::new(&[(0.0, &[("ab", 1.0), ("abcd", 2.0)])]);
        let surface = HeadlessSurface::new(400.0, 300.0);
        let frame = fixture.frame(&surface);
        let rows = frame.legend_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "ab");
        // Widest row: 4 glyphs * 8.4 + 12 + 4.
        let block = 4.0 * 14.0 * 0.6 + 16.0;
        assert!((rows[0].swatch.x - (400.0 - block) / 2.0).abs() < 1e-4);
        assert_eq!(rows[0].swatch.x, rows[1].swatch.x);
        assert_eq!(rows[0].swatch.y, 7.0);
        assert_eq!(rows[1].swatch.y, 25.0);
        assert!((rows[0].label.x - (rows[0].swatch.x + 16.0)).abs() < 1e-4);
        // Legend height 14 + 4 + 14 pushes the plot down.
        assert_eq!(frame.plot_rect().min.y, 32.0 + 15.0);
    }

    #[test]
    fn tick_labels_are_right_aligned() {
        let fixture = Fixture::new(&[(0.0, &[("x", 0.0)]), (10.0, &[("x", 100.0)])]);
        let surface = HeadlessSurface::new(400.0, 300.0);
        let frame = fixture.frame(&surface);
        let mut rights = frame.commands().commands().iter().filter_map(|command| match command {
            RenderCommand::Text { position, text, style } if text != "x" => {
                Some(position.x + surface.measure_text(text, style.size))
            }
            _ => None,
        });
        let first = rights.next().unwrap();
        assert!(rights.all(|right| (right - first).abs() < 1e-3));
        assert!((frame.plot_rect().min.x - (first + 15.0)).abs() < 1e-3);
    }

    #[test]
    fn series_are_clipped_and_aligned() {
        let fixture = Fixture::new(&[(0.0, &[("x", 1.0)]), (10.0, &[("x", 3.0)])]);
        let surface = HeadlessSurface::new(400.0, 300.0).with_scale(2.0, 2.0);
        let frame = fixture.frame(&surface);
        let commands = frame.commands().commands();
        let clip = commands
            .iter()
            .position(|command| matches!(command, RenderCommand::ClipRect(_)))
            .unwrap();
        assert_eq!(commands[clip], RenderCommand::ClipRect(frame.plot_rect()));
        let RenderCommand::Polyline { points, style } = &commands[clip + 1] else {
            panic!("expected series polyline");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(style.width, 2.0);
        for point in points {
            let device = point.x * 2.0;
            assert!((device - device.floor() - 0.5).abs() < 1e-3);
        }
        assert_eq!(commands.last(), Some(&RenderCommand::ClipEnd));
    }

    #[test]
    fn grid_has_fixed_columns_and_one_row_per_tick() {
        let fixture = Fixture::new(&[(0.0, &[("x", 1.0)])]);
        let surface = HeadlessSurface::new(400.0, 300.0);
        let frame = fixture.frame(&surface);
        let grid = frame
            .commands()
            .commands()
            .iter()
            .filter(|command| {
                matches!(command, RenderCommand::Polyline { style, .. } if style.color == fixture.options.grid_line_color)
            })
            .count();
        assert_eq!(grid, 5 + frame.axis().ticks().len());
    }

    #[test]
    fn tiny_surface_skips_plot() {
        let fixture = Fixture::new(&[(0.0, &[("x", 1.0)])]);
        let surface = HeadlessSurface::new(30.0, 30.0);
        let frame = fixture.frame(&surface);
        assert!(!frame.plot_rect().is_valid());
        assert!(
            !frame
                .commands()
                .commands()
                .iter()
                .any(|command| matches!(command, RenderCommand::ClipRect(_)))
        );
    }
}
