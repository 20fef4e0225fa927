//! Periodic gait monitoring: inbound sample feed, evaluator thread, callback

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::buffer::SampleBuffer;
use crate::classifier::{DecisionBoundary, WindowClassifier, WindowReport};
use crate::error::{GaitError, Result};
use crate::sample::RawSample;

/// Monitor configuration: window period and decision boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Time between window evaluations
    pub window: Duration,
    /// Separator applied to each window's features
    pub boundary: DecisionBoundary,
}

impl MonitorConfig {
    /// Nominal evaluation period the boundary was calibrated for.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

    fn validate(&self) -> Result<()> {
        if self.window.is_zero() {
            return Err(GaitError::InvalidParameter(
                "window period must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            boundary: DecisionBoundary::CALIBRATED,
        }
    }
}

/// Cloneable inbound handle for accelerometer readings.
///
/// Any thread may push samples; each finite reading is reduced to its
/// gravity-compensated magnitude and appended to the current window.
/// Non-finite readings are dropped and counted instead of poisoning the
/// window's energy with NaN.
#[derive(Debug, Clone)]
pub struct SampleFeed {
    inner: Arc<FeedInner>,
}

#[derive(Debug)]
struct FeedInner {
    buffer: SampleBuffer,
    rejected: AtomicU64,
}

impl SampleFeed {
    fn new() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                buffer: SampleBuffer::new(),
                rejected: AtomicU64::new(0),
            }),
        }
    }

    /// Feed one tri-axis reading in m/s².
    pub fn on_sample(&self, x: f64, y: f64, z: f64) {
        self.push(RawSample::new(x, y, z));
    }

    /// Feed one raw sample.
    pub fn push(&self, sample: RawSample) {
        if !sample.is_finite() {
            self.inner.rejected.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.inner.buffer.append(sample.magnitude());
    }

    /// Samples accumulated in the current window so far.
    pub fn pending_samples(&self) -> usize {
        self.inner.buffer.len()
    }

    /// Total non-finite readings dropped since the feed was created.
    pub fn rejected_samples(&self) -> u64 {
        self.inner.rejected.load(Ordering::Relaxed)
    }

    fn drain(&self) -> Vec<f64> {
        self.inner.buffer.drain()
    }
}

/// Background gait monitor.
///
/// Owns an evaluator thread that wakes once per configured window period,
/// drains the sample buffer, classifies the window, and hands the
/// [`WindowReport`] to the user callback. Samples arriving between wakes
/// accumulate via the [`SampleFeed`].
///
/// # Example
///
/// ```no_run
/// use gait_classifier::{GaitMonitor, MonitorConfig};
///
/// let monitor = GaitMonitor::start(MonitorConfig::default(), |report| {
///     println!("window {}: {}", report.window_index, report.classification);
/// })?;
///
/// let feed = monitor.feed();
/// feed.on_sample(0.1, -0.2, 9.9);
/// // ... keep feeding; a report arrives every window period ...
///
/// monitor.stop();
/// # Ok::<(), gait_classifier::GaitError>(())
/// ```
#[derive(Debug)]
pub struct GaitMonitor {
    feed: SampleFeed,
    shutdown: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl GaitMonitor {
    /// Validate the configuration and start the evaluator thread.
    ///
    /// The first evaluation fires one full window period after this call
    /// returns; `callback` then runs on the evaluator thread once per window.
    pub fn start<F>(config: MonitorConfig, callback: F) -> Result<Self>
    where
        F: FnMut(WindowReport) + Send + 'static,
    {
        config.validate()?;

        let feed = SampleFeed::new();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let evaluator_feed = feed.clone();
        let handle = std::thread::spawn(move || {
            run_evaluator(
                evaluator_feed,
                config.boundary,
                config.window,
                shutdown_rx,
                callback,
            )
        });

        Ok(Self {
            feed,
            shutdown: shutdown_tx,
            handle: Some(handle),
        })
    }

    /// A clone of the inbound feed.
    pub fn feed(&self) -> SampleFeed {
        self.feed.clone()
    }

    /// Signal shutdown and join the evaluator thread.
    ///
    /// An evaluation already in flight completes and its report is delivered;
    /// once this returns, no further callbacks run. Samples still in the
    /// buffer are left undrained and never classified.
    pub fn stop(mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GaitMonitor {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_evaluator<F>(
    feed: SampleFeed,
    boundary: DecisionBoundary,
    period: Duration,
    shutdown: mpsc::Receiver<()>,
    mut callback: F,
) where
    F: FnMut(WindowReport),
{
    let mut classifier = WindowClassifier::new(boundary);
    // Absolute deadline schedule: the next deadline advances by exactly one
    // period per window, so classification time does not stretch the cadence.
    let mut deadline = Instant::now() + period;

    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match shutdown.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let samples = feed.drain();
        let report = classifier.classify_window(&samples);
        callback(report);

        deadline += period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Sender;
    use std::thread;

    fn start_with_channel(window: Duration) -> (GaitMonitor, mpsc::Receiver<WindowReport>) {
        let (tx, rx): (Sender<WindowReport>, _) = mpsc::channel();
        let config = MonitorConfig {
            window,
            boundary: DecisionBoundary::CALIBRATED,
        };
        let monitor = GaitMonitor::start(config, move |report| {
            let _ = tx.send(report);
        })
        .unwrap();
        (monitor, rx)
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = MonitorConfig {
            window: Duration::ZERO,
            boundary: DecisionBoundary::CALIBRATED,
        };
        let result = GaitMonitor::start(config, |_| {});
        assert!(matches!(result, Err(GaitError::InvalidParameter(_))));
    }

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.window, Duration::from_secs(10));
        assert_eq!(config.boundary, DecisionBoundary::CALIBRATED);
    }

    #[test]
    fn test_feed_rejects_non_finite() {
        let feed = SampleFeed::new();
        feed.on_sample(1.0, 2.0, 3.0);
        feed.on_sample(f64::NAN, 0.0, 0.0);
        feed.on_sample(0.0, f64::INFINITY, 0.0);
        assert_eq!(feed.pending_samples(), 1);
        assert_eq!(feed.rejected_samples(), 2);
    }

    #[test]
    fn test_reports_arrive_each_window() {
        let (monitor, rx) = start_with_channel(Duration::from_millis(50));
        let feed = monitor.feed();

        // Flat-on-table rest signal: magnitudes near zero, always walking.
        feed.on_sample(0.0, 0.0, 9.81);
        feed.on_sample(0.0, 0.0, 9.81);

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.window_index, 0);
        assert_eq!(second.window_index, 1);

        monitor.stop();
    }

    #[test]
    fn test_every_sample_in_exactly_one_window() {
        let (monitor, rx) = start_with_channel(Duration::from_millis(40));
        let feed = monitor.feed();

        let producer = {
            let feed = feed.clone();
            thread::spawn(move || {
                for i in 0..1_000 {
                    let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                    feed.on_sample(sign * 0.5, 0.0, 9.81);
                }
            })
        };
        producer.join().unwrap();

        // Let at least one window elapse, then stop and account for every
        // sample: each one is either in some report or still pending, never
        // both, never twice.
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        monitor.stop();

        let mut total = first.sample_count;
        total += rx.try_iter().map(|r| r.sample_count).sum::<usize>();
        total += feed.pending_samples();
        assert_eq!(total, 1_000);
    }

    #[test]
    fn test_no_reports_after_stop() {
        let (monitor, rx) = start_with_channel(Duration::from_millis(30));
        let _ = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        monitor.stop();

        // Drain anything delivered before the stop completed.
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(120));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_empty_windows_classify_as_walking() {
        let (monitor, rx) = start_with_channel(Duration::from_millis(30));
        let report = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(report.sample_count, 0);
        assert!(!report.classification.is_running());
        monitor.stop();
    }
}
