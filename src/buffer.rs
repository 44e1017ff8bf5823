//! Sliding-window sample storage.
//!
//! Samples are appended at the tail and expire from the head, so both
//! ingestion and pruning only touch the samples they add or remove.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::registry::SeriesRegistry;
use crate::render::Color;
use crate::sample::Sample;
use crate::timeline::TimeMapper;
use crate::view::Range;

/// A sample placed on the animation timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedSample {
    sample: Sample,
    anim_timestamp: f64,
}

impl BufferedSample {
    pub(crate) fn new(sample: Sample, anim_timestamp: f64) -> Self {
        Self {
            sample,
            anim_timestamp,
        }
    }

    /// External timestamp as received.
    pub fn timestamp(&self) -> f64 {
        self.sample.timestamp()
    }

    /// Position on the animation timeline, fixed at ingestion.
    pub fn anim_timestamp(&self) -> f64 {
        self.anim_timestamp
    }

    /// The `(key, value)` readings.
    pub fn data(&self) -> &[(String, f64)] {
        self.sample.data()
    }

    /// Value for a key, if the sample has one.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.sample.value(key)
    }
}

/// Outcome of one [`SampleBuffer::add_samples`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Samples appended.
    pub appended: usize,
    /// Samples ignored because they had no usable readings.
    pub skipped: usize,
    /// Samples that expired from the head.
    pub pruned: usize,
}

/// Ordered samples within the window, plus the series they reference.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<BufferedSample>,
    registry: SeriesRegistry,
}

impl SampleBuffer {
    /// Create an empty buffer coloring series from `palette`.
    pub fn new(palette: Vec<Color>) -> Self {
        Self {
            samples: VecDeque::new(),
            registry: SeriesRegistry::new(palette),
        }
    }

    /// Ingest a batch, then drop everything older than the window.
    ///
    /// Samples without finite readings are ignored.
    pub fn add_samples(
        &mut self,
        batch: impl IntoIterator<Item = Sample>,
        timeline: &TimeMapper,
        window_ms: f64,
    ) -> IngestReport {
        let mut report = IngestReport::default();
        for sample in batch {
            if self.append(sample, timeline) {
                report.appended += 1;
            } else {
                report.skipped += 1;
            }
        }
        report.pruned = self.prune(timeline.current_anim_time(), window_ms);
        if report.appended > 0 || report.pruned > 0 {
            debug!(
                "ingested {} samples ({} skipped, {} pruned), {} buffered across {} series",
                report.appended,
                report.skipped,
                report.pruned,
                self.samples.len(),
                self.registry.len()
            );
        }
        report
    }

    /// Append one sample at the tail.
    ///
    /// Returns false when the sample carried nothing to plot or its
    /// timestamp cannot be placed on the timeline.
    pub fn append(&mut self, mut sample: Sample, timeline: &TimeMapper) -> bool {
        if !sample.timestamp().is_finite() {
            warn!("skipping sample with non-finite timestamp {}", sample.timestamp());
            return false;
        }
        let dropped = sample.retain_finite();
        if dropped > 0 {
            warn!(
                "dropped {dropped} non-finite readings from sample at {}",
                sample.timestamp()
            );
        }
        if sample.is_empty() {
            return false;
        }

        let previous = self.samples.back();
        let mut anim_timestamp = timeline.map_timestamp(previous, sample.timestamp());
        if let Some(previous) = previous {
            if anim_timestamp < previous.anim_timestamp() {
                warn!(
                    "sample timestamp {} went backwards from {}, pinning to previous",
                    sample.timestamp(),
                    previous.timestamp()
                );
                anim_timestamp = previous.anim_timestamp();
            }
        }

        for (key, _) in sample.data() {
            self.registry.acquire(key);
        }
        self.samples
            .push_back(BufferedSample::new(sample, anim_timestamp));
        true
    }

    /// Drop head samples with `anim_timestamp + window_ms < now`.
    ///
    /// Returns the number of samples removed.
    pub fn prune(&mut self, now: f64, window_ms: f64) -> usize {
        let mut pruned = 0;
        while let Some(front) = self.samples.front() {
            if front.anim_timestamp() + window_ms >= now {
                break;
            }
            if let Some(expired) = self.samples.pop_front() {
                for (key, _) in expired.data() {
                    self.registry.release(key);
                }
                pruned += 1;
            }
        }
        pruned
    }

    /// Drop all samples and series and restart the color cycle.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.registry.clear();
    }

    /// Series currently referenced by buffered samples.
    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub(crate) fn set_palette(&mut self, palette: Vec<Color>) {
        self.registry.set_palette(palette);
    }

    /// Buffered samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BufferedSample> {
        self.samples.iter()
    }

    /// Oldest buffered sample.
    pub fn first(&self) -> Option<&BufferedSample> {
        self.samples.front()
    }

    /// Newest buffered sample.
    pub fn last(&self) -> Option<&BufferedSample> {
        self.samples.back()
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(anim_timestamp, value)` points of one series, oldest first.
    ///
    /// Samples without the key are skipped, not interpolated.
    pub fn series_points<'a>(&'a self, key: &'a str) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.samples.iter().filter_map(move |sample| {
            sample
                .value(key)
                .map(|value| (sample.anim_timestamp(), value))
        })
    }

    /// Extrema over every buffered value of every series.
    pub fn value_range(&self) -> Option<Range> {
        let mut range: Option<Range> = None;
        for sample in &self.samples {
            for (_, value) in sample.data() {
                range = Some(match range {
                    Some(mut range) => {
                        range.expand_to_include(*value);
                        range
                    }
                    None => Range::point(*value),
                });
            }
        }
        range
    }

    /// Copy of the buffered samples for consumers outside the driver.
    pub fn snapshot(&self) -> Vec<BufferedSample> {
        self.samples.iter().cloned().collect()
    }
}
