//! telemetry_graph is a streaming time-series graph engine for robot
//! telemetry dashboards.
//!
//! Samples arrive in batches with controller timestamps. The [`Graph`]
//! rebases them onto a smoothly advancing animation timeline, keeps a
//! sliding window of history, auto-scales the value axis and lays out a
//! legend, grid and one polyline per series. Rendering goes through the
//! [`Surface`] trait, so the same frame can be painted headless or, with the
//! `gpui` feature, into a GPUI window.

#![forbid(unsafe_code)]

pub mod axis;
pub mod buffer;
pub mod clock;
pub mod driver;
pub mod error;
pub mod geom;
#[cfg(feature = "gpui")]
pub mod gpui_backend;
pub mod graph;
pub mod lifecycle;
pub mod offload;
pub mod options;
pub mod registry;
pub mod render;
pub mod sample;
pub mod telemetry;
pub mod timeline;
pub mod transform;
pub mod view;

pub use axis::{Axis, AxisMode, MAX_TICKS, auto_axis, format_tick, nice_num};
pub use buffer::{BufferedSample, IngestReport, SampleBuffer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{AnimationDriver, DriverState, TickOutcome};
pub use error::GraphError;
pub use geom::{ScreenPoint, ScreenRect};
pub use graph::{Graph, GraphBuilder};
pub use lifecycle::{OpModeLifecycle, OpModeState, STOP_TAG, Transition};
pub use offload::{HistorySnapshot, LogRow, OffloadWorker, build_rows};
pub use options::{DEFAULT_DELAY_MS, DEFAULT_WINDOW_MS, GraphOptions};
pub use registry::{SeriesMeta, SeriesRegistry};
pub use render::{
    Color, Frame, HeadlessSurface, LegendRow, LineStyle, PaintOp, RenderCommand, RenderList,
    Surface, TextMeasurer, TextStyle,
};
pub use sample::Sample;
pub use telemetry::{CatalogStatus, KeyCatalog, KeyInfo, TelemetryPacket, parse_value};
pub use timeline::TimeMapper;
pub use transform::{Projection, align_coord, align_point};
pub use view::Range;
