//! Mapping of external sample timestamps onto the animation timeline.
//!
//! The first sample of a run is placed at the current animation time; every
//! later sample is placed relative to the sample before it using only the
//! difference of their external timestamps. The external clock's epoch never
//! matters, and a reset of the external clock is absorbed after one sample.

use std::sync::Arc;

use log::info;

use crate::buffer::BufferedSample;
use crate::clock::Clock;

/// Animation timeline with a fixed rendering delay and optional freeze.
#[derive(Debug, Clone)]
pub struct TimeMapper {
    clock: Arc<dyn Clock>,
    delay_ms: f64,
    frozen_at: Option<f64>,
}

impl TimeMapper {
    /// Create a live timeline.
    pub fn new(clock: Arc<dyn Clock>, delay_ms: f64) -> Self {
        Self {
            clock,
            delay_ms,
            frozen_at: None,
        }
    }

    /// Rendering delay in milliseconds.
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub(crate) fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms;
    }

    /// The rightmost time shown on the chart.
    ///
    /// Live: clock time plus the delay. Frozen: the clock time captured when
    /// freezing began, plus the delay.
    pub fn current_anim_time(&self) -> f64 {
        self.frozen_at.unwrap_or_else(|| self.clock.now_ms()) + self.delay_ms
    }

    /// Check whether the timeline is frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen_at.is_some()
    }

    /// Freeze or release the right edge of the chart.
    ///
    /// Freezing an already frozen timeline keeps the original freeze time.
    pub fn set_frozen(&mut self, frozen: bool) {
        match (frozen, self.frozen_at) {
            (true, None) => {
                let now = self.clock.now_ms();
                info!("freezing graph timeline at {now:.1} ms");
                self.frozen_at = Some(now);
            }
            (false, Some(_)) => {
                info!("releasing frozen graph timeline");
                self.frozen_at = None;
            }
            _ => {}
        }
    }

    /// Animation timestamp for a sample with external `timestamp`.
    ///
    /// `previous` is the newest buffered sample; without one the sample is
    /// seeded at the current animation time.
    pub fn map_timestamp(&self, previous: Option<&BufferedSample>, timestamp: f64) -> f64 {
        match previous {
            Some(previous) => previous.anim_timestamp() + (timestamp - previous.timestamp()),
            None => self.current_anim_time(),
        }
    }
}
