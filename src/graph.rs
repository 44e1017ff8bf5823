//! The graph engine: sample history, timeline and axis, ready to render.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::axis::{Axis, AxisMode};
use crate::buffer::{IngestReport, SampleBuffer};
use crate::clock::{Clock, SystemClock};
use crate::error::GraphError;
use crate::options::{GraphOptions, validate_delay_ms, validate_window_ms};
use crate::registry::SeriesRegistry;
use crate::render::frame::{FrameInput, build_frame};
use crate::render::{Color, Frame, Surface, TextMeasurer};
use crate::sample::Sample;
use crate::timeline::TimeMapper;

/// A streaming time-series graph.
///
/// Owns the sample window, the series registry and the animation timeline.
/// Nothing here is fatal: bad configuration is rejected while the previous
/// value stays in effect, and rendering without a usable surface does
/// nothing.
#[derive(Debug, Clone)]
pub struct Graph {
    options: GraphOptions,
    axis_mode: AxisMode,
    timeline: TimeMapper,
    buffer: SampleBuffer,
}

impl Graph {
    /// Create a graph reading time from `clock`.
    ///
    /// Invalid options fall back to their defaults.
    pub fn new(mut options: GraphOptions, clock: Arc<dyn Clock>) -> Self {
        for name in options.sanitize() {
            warn!("graph option `{name}` is invalid, using the default");
        }
        let timeline = TimeMapper::new(clock, options.delay_ms);
        let buffer = SampleBuffer::new(options.colors.clone());
        Self {
            options,
            axis_mode: AxisMode::Auto,
            timeline,
            buffer,
        }
    }

    /// Start building a graph with custom configuration.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Access the options in effect.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Ingest a batch of samples and prune what fell out of the window.
    pub fn add_samples(&mut self, batch: impl IntoIterator<Item = Sample>) -> IngestReport {
        self.buffer
            .add_samples(batch, &self.timeline, self.options.window_ms)
    }

    /// Drop samples that fell out of the window without ingesting.
    pub fn prune(&mut self) -> usize {
        self.buffer
            .prune(self.timeline.current_anim_time(), self.options.window_ms)
    }

    /// Freeze or release the right edge of the chart.
    ///
    /// Ingestion continues while frozen.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.timeline.set_frozen(frozen);
    }

    /// Check whether the timeline is frozen.
    pub fn is_frozen(&self) -> bool {
        self.timeline.is_frozen()
    }

    /// Drop all samples and series. The timeline is left as is.
    pub fn clear(&mut self) {
        info!(
            "clearing graph ({} samples, {} series)",
            self.buffer.len(),
            self.buffer.registry().len()
        );
        self.buffer.clear();
    }

    /// Change the window span.
    ///
    /// Takes effect on the next ingestion, prune or render.
    pub fn set_window_ms(&mut self, window_ms: f64) -> Result<(), GraphError> {
        if let Err(err) = validate_window_ms(window_ms) {
            warn!("{err}, keeping {} ms", self.options.window_ms);
            return Err(err);
        }
        self.options.window_ms = window_ms;
        Ok(())
    }

    /// Change the rendering delay.
    pub fn set_delay_ms(&mut self, delay_ms: f64) -> Result<(), GraphError> {
        if let Err(err) = validate_delay_ms(delay_ms) {
            warn!("{err}, keeping {} ms", self.options.delay_ms);
            return Err(err);
        }
        self.options.delay_ms = delay_ms;
        self.timeline.set_delay_ms(delay_ms);
        Ok(())
    }

    /// Replace the series palette for series that appear from now on.
    pub fn set_colors(&mut self, colors: Vec<Color>) -> Result<(), GraphError> {
        if colors.is_empty() {
            let err = GraphError::option("colors", "palette is empty");
            warn!("{err}, keeping the current palette");
            return Err(err);
        }
        self.buffer.set_palette(colors.clone());
        self.options.colors = colors;
        Ok(())
    }

    /// Access the axis mode.
    pub fn axis_mode(&self) -> AxisMode {
        self.axis_mode
    }

    /// Switch between auto-scaling and a fixed range.
    ///
    /// A fixed range with `min >= max`, or a tick count outside
    /// `2..=MAX_TICKS`, is rejected and the previous mode kept.
    pub fn set_axis_mode(&mut self, mode: AxisMode) -> Result<(), GraphError> {
        if let Err(err) = mode.validate() {
            warn!("{err}, keeping axis mode {:?}", self.axis_mode);
            return Err(err);
        }
        if mode != self.axis_mode {
            info!("axis mode set to {mode:?}");
        }
        self.axis_mode = mode;
        Ok(())
    }

    /// Axis for the currently buffered values.
    pub fn axis(&self) -> Axis {
        self.axis_mode
            .resolve(self.buffer.value_range(), self.options.max_ticks)
    }

    /// The rightmost time shown on the chart.
    pub fn current_anim_time(&self) -> f64 {
        self.timeline.current_anim_time()
    }

    /// Access the timeline.
    pub fn timeline(&self) -> &TimeMapper {
        &self.timeline
    }

    /// Active series in legend order.
    pub fn series(&self) -> &SeriesRegistry {
        self.buffer.registry()
    }

    /// Access the sample window.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Lay out a frame for a surface of `size` CSS pixels at `scale`.
    pub fn frame<M: TextMeasurer + ?Sized>(
        &self,
        size: (f32, f32),
        scale: (f32, f32),
        measurer: &M,
    ) -> Frame {
        let input = FrameInput {
            options: &self.options,
            buffer: &self.buffer,
            axis: self.axis(),
            now: self.current_anim_time(),
            size,
            scale,
        };
        build_frame(&input, measurer)
    }

    /// Draw the current frame.
    ///
    /// Without a surface, or on a surface with no area, nothing is drawn and
    /// `None` is returned.
    pub fn render(&self, surface: Option<&mut dyn Surface>) -> Option<Frame> {
        let Some(surface) = surface else {
            debug!("no surface attached, skipping render");
            return None;
        };
        let (width, height) = surface.size();
        if !(width > 0.0 && height > 0.0) {
            debug!("surface is {width}x{height}, skipping render");
            return None;
        }
        let frame = self.frame((width, height), surface.scale(), &*surface);
        frame.paint(surface);
        Some(frame)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for configuring a graph before construction.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    options: GraphOptions,
    axis_mode: AxisMode,
    clock: Option<Arc<dyn Clock>>,
}

impl GraphBuilder {
    /// Set the options.
    pub fn options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the initial axis mode.
    pub fn axis_mode(mut self, mode: AxisMode) -> Self {
        self.axis_mode = mode;
        self
    }

    /// Set the time source. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the graph.
    ///
    /// An invalid axis mode is logged and replaced by auto-scaling.
    pub fn build(self) -> Graph {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let mut graph = Graph::new(self.options, clock);
        // Rejection is already logged and leaves auto-scaling in place.
        graph.set_axis_mode(self.axis_mode).ok();
        graph
    }
}
