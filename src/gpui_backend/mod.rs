//! GPUI integration for telemetry_graph.
//!
//! This module provides a [`Surface`](crate::render::Surface) backed by a
//! GPUI window and a view that runs the animation loop of a
//! [`Graph`](crate::graph::Graph).

mod paint;
mod view;

pub use paint::GpuiSurface;
pub use view::{GraphHandle, GraphView};
