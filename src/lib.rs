//! Walking vs. running classification from phone accelerometer data
//!
//! This library ingests tri-axis accelerometer readings, reduces each one to
//! a gravity-compensated magnitude, accumulates magnitudes into fixed-period
//! windows, and labels every window as walking or running with a calibrated
//! linear decision rule over two window features (signal energy and
//! zero-crossing frequency).
//!
//! # Quick Start
//!
//! ## Live Monitoring
//! ```no_run
//! use gait_classifier::{GaitMonitor, MonitorConfig};
//!
//! let monitor = GaitMonitor::start(MonitorConfig::default(), |report| {
//!     println!(
//!         "window {}: {} (energy {:.1}, frequency {:.1})",
//!         report.window_index,
//!         report.classification,
//!         report.features.energy,
//!         report.features.frequency,
//!     );
//! })?;
//!
//! // Feed readings from any thread; a report arrives every 10 seconds.
//! let feed = monitor.feed();
//! feed.on_sample(0.12, -0.34, 9.92);
//!
//! monitor.stop();
//! # Ok::<(), gait_classifier::GaitError>(())
//! ```
//!
//! ## One-Shot Window Classification
//! ```
//! use gait_classifier::{DecisionBoundary, RawSample, WindowClassifier};
//!
//! let readings = [
//!     RawSample::new(0.1, 0.2, 9.9),
//!     RawSample::new(-0.3, 0.1, 9.7),
//!     RawSample::new(0.2, -0.1, 10.0),
//! ];
//! let magnitudes: Vec<f64> = readings.iter().map(|r| r.magnitude()).collect();
//!
//! let mut classifier = WindowClassifier::new(DecisionBoundary::CALIBRATED);
//! let report = classifier.classify_window(&magnitudes);
//! println!("{} (score {:.2})", report.classification, report.score);
//! ```
//!
//! ## Offline Recordings
//! ```no_run
//! use gait_classifier::Recording;
//!
//! let recording = Recording::load("walk.csv")?;
//! println!(
//!     "{} samples over {:.1} s",
//!     recording.len(),
//!     recording.duration_secs(),
//! );
//! # Ok::<(), gait_classifier::GaitError>(())
//! ```

pub mod buffer;
pub mod classifier;
pub mod common;
pub mod error;
pub mod features;
pub mod monitor;
pub mod recording;
pub mod sample;
pub mod simulate;

// Re-export public API
pub use buffer::SampleBuffer;
pub use classifier::{Classification, DecisionBoundary, WindowClassifier, WindowReport};
pub use common::{meter, signed_bar, TimeKeeper};
pub use error::{GaitError, Result};
pub use features::{energy, frequency, zero_crossings, WindowFeatures};
pub use monitor::{GaitMonitor, MonitorConfig, SampleFeed};
pub use recording::{RecordedSample, Recording, RecordingWriter};
pub use sample::{RawSample, STANDARD_GRAVITY};
pub use simulate::{GaitProfile, SignalGenerator};
