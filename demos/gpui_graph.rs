#[cfg(feature = "gpui")]
use std::time::Duration;

#[cfg(feature = "gpui")]
use gpui::{
    AppContext, Application, AsyncWindowContext, Bounds, Timer, WindowBounds, WindowOptions, px,
    size,
};

#[cfg(feature = "gpui")]
use telemetry_graph::{Graph, GraphOptions, OpModeLifecycle, Sample, gpui_backend::GraphView};

#[cfg(feature = "gpui")]
fn main() {
    simple_logger::init_with_level(log::Level::Info).ok();

    Application::new().run(|cx| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(900.0), px(600.0)),
                cx,
            ))),
            ..Default::default()
        };

        cx.open_window(options, |window, cx| {
            let graph = Graph::builder()
                .options(GraphOptions::default().with_window_ms(8000.0))
                .build();
            let view = GraphView::new(graph);
            let handle = view.graph_handle();
            let view_handle = cx.new(|_| view);

            let mut lifecycle = OpModeLifecycle::new();
            if let Some(transition) = lifecycle.update("Demo", "RUNNING") {
                handle.apply_op_mode(&transition);
            }

            window
                .spawn(cx, move |cx: &mut AsyncWindowContext| {
                    let cx = cx.clone();
                    async move {
                        // Packets arrive every 50 ms, several readings each.
                        let mut timestamp = 0.0_f64;
                        loop {
                            Timer::after(Duration::from_millis(50)).await;
                            let batch: Vec<Sample> = (0..5)
                                .filter_map(|_| {
                                    timestamp += 10.0;
                                    let phase = timestamp / 1000.0;
                                    Sample::new(
                                        timestamp,
                                        [
                                            ("heading", phase.sin() * 90.0),
                                            ("velocity", (phase * 0.7).cos() * 40.0 + 20.0),
                                        ],
                                    )
                                    .ok()
                                })
                                .collect();
                            handle.push_samples(batch);
                            if cx.update(|_, _| ()).is_err() {
                                break;
                            }
                        }
                    }
                })
                .detach();

            view_handle
        })
        .unwrap();
    });
}

#[cfg(not(feature = "gpui"))]
fn main() {
    eprintln!("Enable the gpui feature to run this example.");
}
