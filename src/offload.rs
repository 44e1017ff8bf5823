//! Off-thread processing of graph history.
//!
//! Heavy downstream work (rebuilding a filtered log view over a long
//! history, exporting) runs on a worker thread. The worker only ever sees an
//! immutable [`HistorySnapshot`]; the driver's buffer is never shared. Only
//! the newest request counts: submitting again or cancelling makes every
//! older result be dropped, whether it is still queued, running or already
//! finished.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};
use serde::Serialize;

use crate::buffer::BufferedSample;
use crate::error::GraphError;

/// Immutable copy of buffered history, tagged with the driver epoch.
///
/// Cloning is cheap; all clones share the same samples.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    epoch: u64,
    samples: Arc<[BufferedSample]>,
}

impl HistorySnapshot {
    pub(crate) fn new(epoch: u64, samples: Vec<BufferedSample>) -> Self {
        Self {
            epoch,
            samples: samples.into(),
        }
    }

    /// Driver epoch the snapshot was taken in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> &[BufferedSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check whether the snapshot holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One reading flattened out of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    /// External timestamp of the sample.
    pub timestamp: f64,
    /// Series key.
    pub key: String,
    /// Reading.
    pub value: f64,
}

/// Flatten the readings of the selected keys, oldest first.
pub fn build_rows(snapshot: &HistorySnapshot, keys: &[String]) -> Vec<LogRow> {
    snapshot
        .samples()
        .iter()
        .flat_map(|sample| {
            let timestamp = sample.timestamp();
            sample
                .data()
                .iter()
                .filter(move |(key, _)| keys.contains(key))
                .map(move |(key, value)| LogRow {
                    timestamp,
                    key: key.clone(),
                    value: *value,
                })
        })
        .collect()
}

type Job<T> = Box<dyn FnOnce() -> T + Send>;

struct Request<T> {
    generation: u64,
    job: Job<T>,
}

/// A worker thread running one job at a time, last request wins.
pub struct OffloadWorker<T> {
    requests: Option<mpsc::Sender<Request<T>>>,
    results: mpsc::Receiver<(u64, T)>,
    generation: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> OffloadWorker<T> {
    /// Start a named worker thread.
    pub fn spawn(name: &str) -> Result<Self, GraphError> {
        let (request_tx, request_rx) = mpsc::channel::<Request<T>>();
        let (result_tx, result_rx) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));
        let current = Arc::clone(&generation);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(mut request) = request_rx.recv() {
                    // Skip straight to the newest queued request.
                    while let Ok(newer) = request_rx.try_recv() {
                        request = newer;
                    }
                    if request.generation != current.load(Ordering::Acquire) {
                        trace!("offload job {} superseded before start", request.generation);
                        continue;
                    }
                    let output = (request.job)();
                    if request.generation != current.load(Ordering::Acquire) {
                        trace!("offload job {} superseded while running", request.generation);
                        continue;
                    }
                    if result_tx.send((request.generation, output)).is_err() {
                        break;
                    }
                }
            })?;
        debug!("offload worker `{name}` started");
        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            generation,
            handle: Some(handle),
        })
    }

    /// Queue a job, superseding every earlier one.
    ///
    /// Returns the job's generation.
    pub fn submit(&self, job: impl FnOnce() -> T + Send + 'static) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(requests) = &self.requests {
            let request = Request {
                generation,
                job: Box::new(job),
            };
            if requests.send(request).is_err() {
                debug!("offload worker is gone, dropping job {generation}");
            }
        }
        generation
    }

    /// Abandon every submitted job.
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("offload jobs before {generation} cancelled");
    }

    /// Generation of the newest submit or cancel.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Result of the newest job, if it has finished.
    pub fn try_latest(&self) -> Option<T> {
        let mut latest = None;
        while let Ok((generation, output)) = self.results.try_recv() {
            if generation == self.generation() {
                latest = Some(output);
            }
        }
        latest
    }

    /// Wait up to `timeout` for the newest job's result.
    pub fn wait_latest(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok((generation, output)) if generation == self.generation() => {
                    return Some(output);
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

impl<T> std::fmt::Debug for OffloadWorker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffloadWorker")
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T> Drop for OffloadWorker<T> {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use super::*;
    use crate::sample::Sample;

    fn snapshot(epoch: u64) -> HistorySnapshot {
        let samples = [
            (0.0, vec![("a", 1.0), ("b", 2.0)]),
            (10.0, vec![("b", 3.0)]),
            (20.0, vec![("c", 4.0), ("a", 5.0)]),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (timestamp, data))| {
            BufferedSample::new(Sample::new(timestamp, data).unwrap(), index as f64)
        })
        .collect();
        HistorySnapshot::new(epoch, samples)
    }

    #[test]
    fn rows_keep_selected_keys_in_order() {
        let rows = build_rows(&snapshot(0), &["a".to_string(), "c".to_string()]);
        let flat: Vec<(f64, &str, f64)> = rows
            .iter()
            .map(|row| (row.timestamp, row.key.as_str(), row.value))
            .collect();
        assert_eq!(flat, vec![(0.0, "a", 1.0), (20.0, "c", 4.0), (20.0, "a", 5.0)]);
        assert!(build_rows(&snapshot(0), &[]).is_empty());
    }

    #[test]
    fn worker_returns_latest_result() {
        let worker = OffloadWorker::spawn("test-offload").unwrap();
        let history = snapshot(3);
        let keys = vec!["b".to_string()];
        worker.submit(move || (history.epoch(), build_rows(&history, &keys).len()));
        let result = worker.wait_latest(Duration::from_secs(5));
        assert_eq!(result, Some((3, 2)));
    }

    #[test]
    fn newer_submit_discards_older_result() {
        let worker = OffloadWorker::spawn("test-offload").unwrap();
        let (release_tx, release_rx) = channel::<()>();
        let first = worker.submit(move || {
            let _ = release_rx.recv();
            "first"
        });
        let second = worker.submit(|| "second");
        assert!(second > first);
        let _ = release_tx.send(());
        assert_eq!(worker.wait_latest(Duration::from_secs(5)), Some("second"));
        assert_eq!(worker.try_latest(), None);
    }

    #[test]
    fn cancel_discards_running_job() {
        let worker = OffloadWorker::spawn("test-offload").unwrap();
        let (release_tx, release_rx) = channel::<()>();
        worker.submit(move || {
            let _ = release_rx.recv();
            1
        });
        worker.cancel();
        let _ = release_tx.send(());
        assert_eq!(worker.wait_latest(Duration::from_millis(200)), None);
    }
}
