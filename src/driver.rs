//! Per-frame scheduling of ingestion and rendering.
//!
//! The host owns the actual frame callback (a GPUI animation frame, a timer,
//! or a test stepping by hand) and calls [`AnimationDriver::tick`] once per
//! frame. Producers only ever append to the pending queue; each tick drains
//! the whole queue before drawing.

use std::mem;

use log::{info, trace};

use crate::buffer::IngestReport;
use crate::graph::Graph;
use crate::lifecycle::Transition;
use crate::offload::HistorySnapshot;
use crate::render::{Frame, Surface};
use crate::sample::Sample;

/// Playback state of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Ingest and draw every frame.
    #[default]
    Running,
    /// Ingest every frame but skip drawing.
    Paused,
    /// No active run: the timeline is frozen, the last window stays on screen.
    Stopped,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Batches drained from the queue.
    pub batches: usize,
    /// Combined ingestion counts over all drained batches.
    pub ingest: IngestReport,
    /// The frame drawn, if any.
    pub frame: Option<Frame>,
}

/// Frame loop around a [`Graph`].
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    graph: Graph,
    state: DriverState,
    queue: Vec<Vec<Sample>>,
    epoch: u64,
    last_frame: Option<Frame>,
}

impl AnimationDriver {
    /// Wrap a graph, starting in [`DriverState::Running`].
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            state: DriverState::Running,
            queue: Vec::new(),
            epoch: 0,
            last_frame: None,
        }
    }

    /// Access the graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Access the graph mutably, e.g. to reconfigure it.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Current playback state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Reset counter; bumps every time history is discarded.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The most recently drawn frame.
    ///
    /// Hosts that must repaint every frame show this one while paused.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Number of batches waiting for the next tick.
    pub fn pending_batches(&self) -> usize {
        self.queue.len()
    }

    /// Queue a batch for the next tick.
    pub fn enqueue(&mut self, batch: Vec<Sample>) {
        if !batch.is_empty() {
            self.queue.push(batch);
        }
    }

    /// Run one frame: drain every queued batch, then draw unless paused.
    ///
    /// With nothing queued the window is still pruned so expired series
    /// leave the legend.
    pub fn tick(&mut self, surface: Option<&mut dyn Surface>) -> TickOutcome {
        let batches = mem::take(&mut self.queue);
        let mut outcome = TickOutcome {
            batches: batches.len(),
            ..TickOutcome::default()
        };
        if batches.is_empty() {
            outcome.ingest.pruned = self.graph.prune();
        }
        for batch in batches {
            let report = self.graph.add_samples(batch);
            outcome.ingest.appended += report.appended;
            outcome.ingest.skipped += report.skipped;
            outcome.ingest.pruned += report.pruned;
        }

        if self.state != DriverState::Paused {
            outcome.frame = self.graph.render(surface);
            if let Some(frame) = &outcome.frame {
                self.last_frame = Some(frame.clone());
            }
        }
        trace!(
            "tick: {} batches, {} samples in, {} pruned, drawn: {}",
            outcome.batches,
            outcome.ingest.appended,
            outcome.ingest.pruned,
            outcome.frame.is_some()
        );
        outcome
    }

    /// Resume drawing after a pause. Does nothing unless paused.
    pub fn play(&mut self) -> bool {
        if self.state != DriverState::Paused {
            return false;
        }
        info!("graph resumed");
        self.state = DriverState::Running;
        true
    }

    /// Stop drawing while still ingesting. Does nothing unless running.
    pub fn pause(&mut self) -> bool {
        if self.state != DriverState::Running {
            return false;
        }
        info!("graph paused");
        self.state = DriverState::Paused;
        true
    }

    /// Toggle between running and paused. Ignored while stopped.
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            DriverState::Running => self.pause(),
            DriverState::Paused => self.play(),
            DriverState::Stopped => false,
        }
    }

    /// Begin a run: release the timeline and draw every frame.
    pub fn start(&mut self) {
        if self.state != DriverState::Running {
            info!("graph running");
        }
        self.graph.set_frozen(false);
        self.state = DriverState::Running;
    }

    /// End a run: freeze the timeline on the last window.
    pub fn stop(&mut self) {
        if self.state != DriverState::Stopped {
            info!("graph stopped");
        }
        self.graph.set_frozen(true);
        self.state = DriverState::Stopped;
    }

    /// Discard all history and pending batches and start a new epoch.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.graph.clear();
        self.last_frame = None;
        self.epoch += 1;
        info!("graph reset, epoch {}", self.epoch);
    }

    /// React to an op-mode transition.
    ///
    /// Entering STOPPED stops the driver. Entering INIT or RUNNING starts it,
    /// resetting history first when a new run begins.
    pub fn apply_op_mode(&mut self, transition: &Transition) {
        if !transition.to.is_active() {
            self.stop();
            return;
        }
        if transition.starts_new_run() {
            self.reset();
        }
        self.start();
    }

    /// Immutable copy of the current history for off-thread consumers.
    pub fn history_snapshot(&self) -> HistorySnapshot {
        HistorySnapshot::new(self.epoch, self.graph.buffer().snapshot())
    }
}
