//! Time sources for the animation timeline.
//!
//! The engine never reads the wall clock directly; every "now" goes through a
//! [`Clock`], which keeps pruning and layout deterministic under test.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic millisecond clock.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds on an arbitrary but fixed epoch.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the graph.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at the given time.
    pub fn new(start_ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_ms: f64) {
        self.bits.store(now_ms.to_bits(), Ordering::Relaxed);
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: f64) {
        self.set(self.now_ms() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::new(100.0);
        let handle = clock.clone();
        handle.advance(25.0);
        assert_eq!(clock.now_ms(), 125.0);
        clock.set(10.0);
        assert_eq!(handle.now_ms(), 10.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
