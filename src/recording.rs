//! CSV recording format for offline tools
//!
//! A recording is a plain-text CSV file with one `timestamp_s,x,y,z` row per
//! accelerometer sample and a `#`-prefixed comment header carrying the
//! nominal sample rate and the collection start time. The format is meant to
//! be trivially producible from any phone logging app.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{GaitError, Result};
use crate::sample::RawSample;

const FORMAT_VERSION: &str = "1.0";

/// One recorded accelerometer sample with its capture time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedSample {
    /// Seconds since the start of the recording
    pub timestamp: f64,
    /// The tri-axis reading
    pub sample: RawSample,
}

impl RecordedSample {
    /// Gravity-compensated magnitude of the reading.
    pub fn magnitude(&self) -> f64 {
        self.sample.magnitude()
    }
}

/// Streaming CSV writer for accelerometer recordings.
pub struct RecordingWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    sample_count: usize,
}

impl RecordingWriter {
    /// Create a new recording file, writing the comment header immediately.
    ///
    /// # Arguments
    /// * `path` - File path
    /// * `rate` - Nominal sample rate in Hz
    pub fn create<P: AsRef<Path>>(path: P, rate: f64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| GaitError::Recording {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let header = format!(
            "# gait recording v{}\n# start_time: {}\n# rate_hz: {}\n# columns: timestamp_s,x,y,z\n",
            FORMAT_VERSION,
            chrono::Local::now().to_rfc3339(),
            rate,
        );
        writer
            .write_all(header.as_bytes())
            .map_err(|source| GaitError::Recording {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer,
            path,
            sample_count: 0,
        })
    }

    /// Append a single sample row.
    pub fn append(&mut self, timestamp: f64, sample: RawSample) -> Result<()> {
        writeln!(
            self.writer,
            "{:.6},{:.6},{:.6},{:.6}",
            timestamp, sample.x, sample.y, sample.z
        )
        .map_err(|source| GaitError::Recording {
            path: self.path.clone(),
            source,
        })?;
        self.sample_count += 1;
        Ok(())
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| GaitError::Recording {
            path: self.path.clone(),
            source,
        })
    }

    /// Number of samples written so far.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

/// A fully loaded recording.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Nominal rate from the header, if present
    pub rate_hz: Option<f64>,
    /// Samples in file order
    pub samples: Vec<RecordedSample>,
}

impl Recording {
    /// Load a recording from a CSV file.
    ///
    /// Comment lines (`#`) and blank lines are skipped; a `# rate_hz:`
    /// comment is parsed into [`Recording::rate_hz`]. Every data row must
    /// have exactly four numeric fields; malformed rows fail with the
    /// one-based line number.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GaitError::Recording {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut rate_hz = None;
        let mut samples = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|source| GaitError::Recording {
                path: path.to_path_buf(),
                source,
            })?;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                if let Some(rate) = comment.trim().strip_prefix("rate_hz:") {
                    rate_hz = rate.trim().parse::<f64>().ok();
                }
                continue;
            }

            samples.push(parse_row(trimmed, line_number)?);
        }

        Ok(Self { rate_hz, samples })
    }

    /// Number of samples in the recording.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the recording holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration covered by the recording in seconds.
    pub fn duration_secs(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Samples whose timestamps fall in `[start, end)`.
    pub fn time_slice(&self, start: f64, end: f64) -> &[RecordedSample] {
        let begin = self.samples.partition_point(|s| s.timestamp < start);
        let stop = self.samples.partition_point(|s| s.timestamp < end);
        &self.samples[begin..stop]
    }
}

fn parse_row(row: &str, line_number: usize) -> Result<RecordedSample> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(GaitError::RecordingFormat {
            line: line_number,
            message: format!("expected 4 fields, found {}", fields.len()),
        });
    }

    let mut values = [0.0f64; 4];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field.parse().map_err(|_| GaitError::RecordingFormat {
            line: line_number,
            message: format!("not a number: {field:?}"),
        })?;
    }

    Ok(RecordedSample {
        timestamp: values[0],
        sample: RawSample::new(values[1], values[2], values[3]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gait-recording-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_write_then_load() {
        let path = temp_path("roundtrip.csv");
        {
            let mut writer = RecordingWriter::create(&path, 50.0).unwrap();
            writer.append(0.00, RawSample::new(0.1, -0.2, 9.8)).unwrap();
            writer.append(0.02, RawSample::new(0.3, 0.4, 9.9)).unwrap();
            writer.flush().unwrap();
            assert_eq!(writer.sample_count(), 2);
        }

        let recording = Recording::load(&path).unwrap();
        assert_eq!(recording.rate_hz, Some(50.0));
        assert_eq!(recording.len(), 2);
        assert!((recording.samples[0].sample.x - 0.1).abs() < 1e-9);
        assert!((recording.samples[1].timestamp - 0.02).abs() < 1e-9);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_skips_comments_and_blank_lines() {
        let path = temp_path("comments.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# gait recording v1.0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "0.0,1.0,2.0,3.0").unwrap();
        writeln!(file, "# trailing note").unwrap();
        writeln!(file, "0.1,4.0,5.0,6.0").unwrap();
        drop(file);

        let recording = Recording::load(&path).unwrap();
        assert_eq!(recording.rate_hz, None);
        assert_eq!(recording.len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_reports_line_number_for_bad_row() {
        let path = temp_path("badrow.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# rate_hz: 50").unwrap();
        writeln!(file, "0.0,1.0,2.0,3.0").unwrap();
        writeln!(file, "0.1,oops,2.0,3.0").unwrap();
        drop(file);

        match Recording::load(&path) {
            Err(GaitError::RecordingFormat { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected format error, got {other:?}"),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_wrong_field_count() {
        let path = temp_path("fields.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "0.0,1.0,2.0").unwrap();
        drop(file);

        match Recording::load(&path) {
            Err(GaitError::RecordingFormat { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("4 fields"));
            }
            other => panic!("expected format error, got {other:?}"),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let result = Recording::load(temp_path("does-not-exist.csv"));
        assert!(matches!(result, Err(GaitError::Recording { .. })));
    }

    #[test]
    fn test_time_slice() {
        let samples: Vec<RecordedSample> = (0..100)
            .map(|i| RecordedSample {
                timestamp: i as f64 * 0.02,
                sample: RawSample::new(0.0, 0.0, 9.81),
            })
            .collect();
        let recording = Recording {
            rate_hz: Some(50.0),
            samples,
        };

        // [0.2, 0.4) at 20 ms spacing covers samples 10..20.
        let slice = recording.time_slice(0.2, 0.4);
        assert_eq!(slice.len(), 10);
        assert!((slice[0].timestamp - 0.2).abs() < 1e-9);

        assert!((recording.duration_secs() - 99.0 * 0.02).abs() < 1e-9);
    }
}
