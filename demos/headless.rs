use std::sync::Arc;

use telemetry_graph::{
    AnimationDriver, Graph, GraphOptions, HeadlessSurface, KeyCatalog, ManualClock,
    OffloadWorker, OpModeLifecycle, PaintOp, TelemetryPacket, build_rows,
};

const PACKET_MS: f64 = 20.0;

fn packet(timestamp: f64) -> TelemetryPacket {
    let phase = timestamp / 500.0;
    let json = format!(
        r#"{{"timestamp": {timestamp}, "data": {{"heading": "{:.2}", "battery": "{:.1} V", "state": "DRIVE"}}}}"#,
        phase.sin() * 45.0,
        12.6 - timestamp / 10_000.0,
    );
    serde_json::from_str(&json).expect("demo packet")
}

fn main() {
    simple_logger::init_with_level(log::Level::Debug).ok();

    let clock = ManualClock::new(0.0);
    let graph = Graph::builder()
        .options(GraphOptions::default().with_window_ms(1000.0))
        .clock(Arc::new(clock.clone()))
        .build();
    let mut driver = AnimationDriver::new(graph);
    let mut lifecycle = OpModeLifecycle::new();
    let mut catalog = KeyCatalog::new();
    let mut surface = HeadlessSurface::new(800.0, 400.0).with_scale(2.0, 2.0);

    if let Some(transition) = lifecycle.update("AutoDrive", "INIT") {
        driver.apply_op_mode(&transition);
    }
    catalog.observe(&packet(0.0));
    catalog.set_selected("heading", true);
    catalog.set_selected("battery", true);

    let mut timestamp = 0.0;
    for frame in 0..120 {
        clock.advance(1000.0 / 60.0);
        // Roughly one packet per frame, sometimes none.
        if frame % 6 != 5 {
            let packets = [packet(timestamp)];
            timestamp += PACKET_MS;
            driver.enqueue(catalog.ingest(&packets));
        }
        surface.reset();
        let outcome = driver.tick(Some(&mut surface));
        if frame % 30 == 0 {
            let lines = surface
                .ops()
                .iter()
                .filter(|op| matches!(op, PaintOp::Polyline { .. }))
                .count();
            println!(
                "frame {frame}: {} samples buffered, {lines} polylines, axis {:?}",
                driver.graph().len(),
                outcome.frame.map(|frame| frame.axis()),
            );
        }
        if frame == 60
            && let Some(transition) = lifecycle.update("AutoDrive", "RUNNING")
        {
            driver.apply_op_mode(&transition);
        }
    }

    if let Some(transition) = lifecycle.update("$Stop$Robot$", "STOPPED") {
        driver.apply_op_mode(&transition);
    }

    let worker = OffloadWorker::spawn("log-rows").expect("offload worker");
    let snapshot = driver.history_snapshot();
    let keys = catalog.selected_keys();
    worker.submit(move || build_rows(&snapshot, &keys));
    if let Some(rows) = worker.wait_latest(std::time::Duration::from_secs(1)) {
        println!("{} log rows, newest: {:?}", rows.len(), rows.last());
    }
}
