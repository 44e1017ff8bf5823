use std::sync::{Arc, RwLock};

use gpui::prelude::*;
use gpui::{MouseButton, Window, canvas, div};

use crate::driver::{AnimationDriver, DriverState};
use crate::graph::Graph;
use crate::lifecycle::Transition;
use crate::sample::Sample;

use super::paint::{GpuiSurface, to_hsla};

/// A GPUI view that animates a [`Graph`].
///
/// Every rendered frame ticks the [`AnimationDriver`] and asks for the next
/// animation frame, so queued samples are drained at display rate. A left
/// click toggles pause; a paused view repaints the last drawn frame.
#[derive(Clone)]
pub struct GraphView {
    driver: Arc<RwLock<AnimationDriver>>,
}

impl GraphView {
    /// Create a view driving `graph`.
    pub fn new(graph: Graph) -> Self {
        Self::with_driver(AnimationDriver::new(graph))
    }

    /// Create a view around an existing driver.
    pub fn with_driver(driver: AnimationDriver) -> Self {
        Self {
            driver: Arc::new(RwLock::new(driver)),
        }
    }

    /// Get a handle for feeding the graph.
    ///
    /// This is useful for streaming samples from async tasks.
    pub fn graph_handle(&self) -> GraphHandle {
        GraphHandle {
            driver: Arc::clone(&self.driver),
        }
    }

    fn on_click(&mut self, cx: &mut Context<Self>) {
        let mut driver = self.driver.write().expect("graph lock");
        driver.toggle_pause();
        cx.notify();
    }
}

impl Render for GraphView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let driver = Arc::clone(&self.driver);
        let background = self
            .driver
            .read()
            .expect("graph lock")
            .graph()
            .options()
            .background_color;
        window.request_animation_frame();

        div()
            .size_full()
            .bg(to_hsla(background))
            .child(
                canvas(
                    |_, _, _| {},
                    move |bounds, _, window, cx| {
                        let mut driver = driver.write().expect("graph lock");
                        let mut surface = GpuiSurface::new(window, cx, bounds);
                        let outcome = driver.tick(Some(&mut surface));
                        // A paused graph keeps showing its last frame.
                        if outcome.frame.is_none()
                            && let Some(frame) = driver.last_frame()
                        {
                            frame.paint(&mut surface);
                        }
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _, cx| {
                    this.on_click(cx);
                }),
            )
    }
}

/// A handle for feeding a graph held inside a [`GraphView`].
///
/// The handle clones cheaply and can be moved into async tasks.
#[derive(Clone)]
pub struct GraphHandle {
    driver: Arc<RwLock<AnimationDriver>>,
}

impl GraphHandle {
    /// Queue a batch for the next frame.
    pub fn push_samples(&self, batch: Vec<Sample>) {
        self.write(|driver| driver.enqueue(batch));
    }

    /// Forward an op-mode transition to the driver.
    pub fn apply_op_mode(&self, transition: &Transition) {
        self.write(|driver| driver.apply_op_mode(transition));
    }

    /// Current playback state.
    pub fn state(&self) -> DriverState {
        self.read(AnimationDriver::state)
    }

    /// Read the driver state.
    ///
    /// The driver is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&AnimationDriver) -> R) -> R {
        let driver = self.driver.read().expect("graph lock");
        f(&driver)
    }

    /// Mutate the driver state.
    ///
    /// The driver is locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut AnimationDriver) -> R) -> R {
        let mut driver = self.driver.write().expect("graph lock");
        f(&mut driver)
    }
}
