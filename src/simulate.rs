//! Synthetic gait signals for demos and tests
//!
//! Generates deterministic tri-axis samples whose gravity-compensated
//! magnitude follows a sinusoid at a profile's amplitude and step cadence.
//! The profile constants are chosen so a full 10-second window at the
//! nominal 50 Hz rate lands on the correct side of the calibrated boundary.

use std::f64::consts::TAU;
use std::str::FromStr;

use crate::error::{GaitError, Result};
use crate::sample::{RawSample, STANDARD_GRAVITY};

/// Synthetic activity profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitProfile {
    /// Gentle oscillation, walking-pace cadence
    Walking,
    /// Strong oscillation, running-pace cadence
    Running,
}

impl GaitProfile {
    /// Peak magnitude amplitude in m/s².
    pub fn amplitude(&self) -> f64 {
        match self {
            GaitProfile::Walking => 1.2,
            GaitProfile::Running => 9.0,
        }
    }

    /// Full oscillation cycles per second.
    pub fn cycle_hz(&self) -> f64 {
        match self {
            GaitProfile::Walking => 1.0,
            GaitProfile::Running => 2.6,
        }
    }
}

impl FromStr for GaitProfile {
    type Err = GaitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" => Ok(GaitProfile::Walking),
            "running" => Ok(GaitProfile::Running),
            other => Err(GaitError::InvalidParameter(format!(
                "unknown profile {other:?}, expected 'walking' or 'running'"
            ))),
        }
    }
}

impl std::fmt::Display for GaitProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GaitProfile::Walking => write!(f, "walking"),
            GaitProfile::Running => write!(f, "running"),
        }
    }
}

/// Deterministic sample generator for one profile at a fixed rate.
#[derive(Debug, Clone, Copy)]
pub struct SignalGenerator {
    profile: GaitProfile,
    rate_hz: f64,
}

impl SignalGenerator {
    /// Create a generator.
    ///
    /// # Arguments
    /// * `profile` - Activity to synthesize
    /// * `rate_hz` - Sample rate in Hz, must be positive
    pub fn new(profile: GaitProfile, rate_hz: f64) -> Result<Self> {
        if !(rate_hz > 0.0) {
            return Err(GaitError::InvalidParameter(format!(
                "sample rate must be positive, got {rate_hz}"
            )));
        }
        Ok(Self { profile, rate_hz })
    }

    /// The profile being synthesized.
    pub fn profile(&self) -> GaitProfile {
        self.profile
    }

    /// Magnitude the n-th sample will carry.
    pub fn magnitude_at(&self, n: u64) -> f64 {
        let t = n as f64 / self.rate_hz;
        self.profile.amplitude() * (TAU * self.profile.cycle_hz() * t).sin()
    }

    /// The n-th tri-axis sample.
    ///
    /// The oscillation is put entirely on the Z axis on top of gravity, so
    /// the gravity-compensated magnitude reproduces [`magnitude_at`] exactly
    /// (every profile amplitude is below one g, keeping the total positive).
    ///
    /// [`magnitude_at`]: SignalGenerator::magnitude_at
    pub fn sample_at(&self, n: u64) -> RawSample {
        RawSample::new(0.0, 0.0, STANDARD_GRAVITY + self.magnitude_at(n))
    }

    /// Seconds between consecutive samples.
    pub fn sample_interval_secs(&self) -> f64 {
        1.0 / self.rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classification, DecisionBoundary, WindowClassifier};

    #[test]
    fn test_profile_from_str() {
        assert_eq!("walking".parse::<GaitProfile>().unwrap(), GaitProfile::Walking);
        assert_eq!(" Running ".parse::<GaitProfile>().unwrap(), GaitProfile::Running);
        assert!("jogging".parse::<GaitProfile>().is_err());
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(SignalGenerator::new(GaitProfile::Walking, 0.0).is_err());
        assert!(SignalGenerator::new(GaitProfile::Walking, -50.0).is_err());
    }

    #[test]
    fn test_sample_magnitude_reproduces_profile() {
        let generator = SignalGenerator::new(GaitProfile::Running, 50.0).unwrap();
        for n in 0..200 {
            let expected = generator.magnitude_at(n);
            let actual = generator.sample_at(n).magnitude();
            assert!((expected - actual).abs() < 1e-9);
        }
    }

    #[test]
    fn test_generator_is_deterministic() {
        let a = SignalGenerator::new(GaitProfile::Walking, 50.0).unwrap();
        let b = SignalGenerator::new(GaitProfile::Walking, 50.0).unwrap();
        for n in [0, 1, 17, 499] {
            assert_eq!(a.sample_at(n), b.sample_at(n));
        }
    }

    fn classify_full_window(profile: GaitProfile) -> Classification {
        let generator = SignalGenerator::new(profile, 50.0).unwrap();
        let magnitudes: Vec<f64> = (0..500).map(|n| generator.magnitude_at(n)).collect();
        let mut classifier = WindowClassifier::new(DecisionBoundary::CALIBRATED);
        classifier.classify_window(&magnitudes).classification
    }

    #[test]
    fn test_walking_window_classifies_walking() {
        assert_eq!(classify_full_window(GaitProfile::Walking), Classification::Walking);
    }

    #[test]
    fn test_running_window_classifies_running() {
        assert_eq!(classify_full_window(GaitProfile::Running), Classification::Running);
    }
}
