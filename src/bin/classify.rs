//! Offline gait classification tool
//!
//! Post-processing analysis for accelerometer recordings in CSV format.
//!
//! Usage:
//!   classify --input walk.csv
//!   classify --input walk.csv --statistics --spectrum
//!   classify --input walk.csv --start 5.0 --end 25.0 --all

use clap::Parser;
use gait_classifier::{
    DecisionBoundary, RecordedSample, Recording, WindowClassifier,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "classify")]
#[command(about = "Classify walking vs. running in a recorded CSV file", long_about = None)]
struct Args {
    /// Input CSV recording path
    #[arg(short, long)]
    input: PathBuf,

    /// Start time in seconds (optional, default: recording start)
    #[arg(long)]
    start: Option<f64>,

    /// End time in seconds (optional, default: recording end)
    #[arg(long)]
    end: Option<f64>,

    /// Window period in seconds for classification
    #[arg(short, long, default_value = "10")]
    window: f64,

    /// Per-window classification table (default when no other analysis given)
    #[arg(long)]
    classify: bool,

    /// Compute statistical metrics
    #[arg(long)]
    statistics: bool,

    /// FFT spectrum of the magnitude signal (requires 'analysis' feature)
    #[arg(long)]
    spectrum: bool,

    /// Run all analyses
    #[arg(long)]
    all: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.window <= 0.0 {
        eprintln!("Error: window must be positive");
        std::process::exit(1);
    }

    // Load recording
    println!("Loading recording from {}...", args.input.display());
    let recording = Recording::load(&args.input)?;

    if recording.is_empty() {
        eprintln!("Error: No samples in recording");
        return Ok(());
    }

    // Determine time range
    let file_start = recording.samples.first().unwrap().timestamp;
    let file_end = recording.samples.last().unwrap().timestamp;

    let start_time = args.start.unwrap_or(file_start);
    let end_time = args.end.unwrap_or(file_end);

    if start_time < file_start || end_time > file_end {
        eprintln!(
            "Warning: Requested time range [{}, {}] extends beyond recording range [{}, {}]",
            start_time, end_time, file_start, file_end
        );
    }

    if start_time >= end_time {
        eprintln!("Error: Start time must be before end time");
        std::process::exit(1);
    }

    // Filter samples by time range
    let samples: Vec<RecordedSample> = recording
        .samples
        .iter()
        .filter(|s| s.timestamp >= start_time && s.timestamp <= end_time)
        .copied()
        .collect();

    if samples.is_empty() {
        eprintln!("Error: No samples in specified time range");
        return Ok(());
    }

    println!(
        "Loaded {} samples ({:.2}s to {:.2}s)",
        samples.len(),
        samples.first().unwrap().timestamp,
        samples.last().unwrap().timestamp
    );

    // Determine analyses to run; classification is the default
    let run_statistics = args.all || args.statistics;
    let run_spectrum = args.all || args.spectrum;
    let run_classify = args.all || args.classify || !(run_statistics || run_spectrum);

    // Open output
    let mut output: Box<dyn Write> = if let Some(path) = args.output {
        Box::new(File::create(path)?)
    } else {
        Box::new(io::stdout())
    };

    write_header(&mut output, &recording, &samples, start_time, end_time)?;

    if run_classify {
        writeln!(output, "\n{}", "=".repeat(80))?;
        writeln!(output, "WINDOW CLASSIFICATION")?;
        writeln!(output, "{}", "=".repeat(80))?;
        run_classification(&mut output, &samples, args.window)?;
    }

    if run_statistics {
        writeln!(output, "\n{}", "=".repeat(80))?;
        writeln!(output, "STATISTICAL ANALYSIS")?;
        writeln!(output, "{}", "=".repeat(80))?;
        run_statistics_analysis(&mut output, &samples)?;
    }

    if run_spectrum {
        writeln!(output, "\n{}", "=".repeat(80))?;
        writeln!(output, "FREQUENCY SPECTRUM (FFT)")?;
        writeln!(output, "{}", "=".repeat(80))?;
        #[cfg(feature = "analysis")]
        run_spectrum_analysis(&mut output, &samples, sample_rate(&recording, &samples))?;
        #[cfg(not(feature = "analysis"))]
        writeln!(
            output,
            "\nSpectrum analysis not compiled in (rebuild with --features analysis)"
        )?;
    }

    writeln!(output, "\n{}", "=".repeat(80))?;
    writeln!(output, "Analysis complete!")?;

    Ok(())
}

/// Nominal rate from the header, or an estimate from the timestamps.
fn sample_rate(recording: &Recording, samples: &[RecordedSample]) -> f64 {
    recording.rate_hz.unwrap_or_else(|| {
        let span = samples.last().unwrap().timestamp - samples.first().unwrap().timestamp;
        if span > 0.0 {
            (samples.len() - 1) as f64 / span
        } else {
            0.0
        }
    })
}

fn write_header(
    output: &mut dyn Write,
    recording: &Recording,
    samples: &[RecordedSample],
    start_time: f64,
    end_time: f64,
) -> io::Result<()> {
    writeln!(output, "{}", "=".repeat(80))?;
    writeln!(output, "GAIT CLASSIFICATION REPORT")?;
    writeln!(output, "{}", "=".repeat(80))?;
    writeln!(output)?;
    writeln!(output, "Generated: {}", chrono::Local::now().to_rfc3339())?;
    writeln!(output)?;
    writeln!(output, "Recording Information:")?;
    match recording.rate_hz {
        Some(rate) => writeln!(output, "  Sample rate: {:.1} Hz (from header)", rate)?,
        None => writeln!(
            output,
            "  Sample rate: {:.1} Hz (estimated)",
            sample_rate(recording, samples)
        )?,
    }
    writeln!(output, "  Total samples: {}", recording.len())?;
    writeln!(output)?;
    writeln!(output, "Analysis Range:")?;
    writeln!(output, "  Start: {:.2}s", start_time)?;
    writeln!(output, "  End: {:.2}s", end_time)?;
    writeln!(output, "  Duration: {:.2}s", end_time - start_time)?;
    writeln!(output, "  Samples: {}", samples.len())?;
    Ok(())
}

// ============================================================================
// WINDOW CLASSIFICATION
// ============================================================================

/// Cut the samples into consecutive windows by recorded timestamp.
fn cut_windows(samples: &[RecordedSample], window_secs: f64) -> Vec<&[RecordedSample]> {
    let mut windows = Vec::new();
    let base = samples[0].timestamp;
    let mut begin = 0;
    let mut boundary = base + window_secs;

    for (i, sample) in samples.iter().enumerate() {
        if sample.timestamp >= boundary {
            windows.push(&samples[begin..i]);
            begin = i;
            while samples[i].timestamp >= boundary {
                boundary += window_secs;
            }
        }
    }
    windows.push(&samples[begin..]);
    windows
}

fn run_classification(
    output: &mut dyn Write,
    samples: &[RecordedSample],
    window_secs: f64,
) -> io::Result<()> {
    let windows = cut_windows(samples, window_secs);
    let mut classifier = WindowClassifier::new(DecisionBoundary::CALIBRATED);

    writeln!(output)?;
    writeln!(output, "Window period: {:.1} s", window_secs)?;
    writeln!(output)?;
    writeln!(
        output,
        "{:<8} {:>10} {:>10} {:>8} {:>10} {:>10} {:>10}  {}",
        "Window", "Start (s)", "End (s)", "Samples", "Energy", "Frequency", "Score", "Label"
    )?;
    writeln!(output, "{:-<80}", "")?;

    let mut walking = 0u64;
    let mut running = 0u64;

    for window in &windows {
        let magnitudes: Vec<f64> = window.iter().map(|s| s.magnitude()).collect();
        let report = classifier.classify_window(&magnitudes);

        let (start, end) = match (window.first(), window.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => (0.0, 0.0),
        };

        if report.classification.is_running() {
            running += 1;
        } else {
            walking += 1;
        }

        writeln!(
            output,
            "{:<8} {:>10.2} {:>10.2} {:>8} {:>10.2} {:>10.2} {:>10.2}  {}",
            report.window_index,
            start,
            end,
            report.sample_count,
            report.features.energy,
            report.features.frequency,
            report.score,
            report.classification
        )?;
    }

    writeln!(output, "{:-<80}", "")?;
    writeln!(
        output,
        "Total: {} windows ({} walking, {} running)",
        walking + running,
        walking,
        running
    )?;

    Ok(())
}

// ============================================================================
// STATISTICS ANALYSIS
// ============================================================================

#[derive(Debug)]
struct Stats {
    mean: f64,
    rms: f64,
    std_dev: f64,
    min: f64,
    max: f64,
    peak_to_peak: f64,
}

fn compute_stats(data: &[f64]) -> Stats {
    let n = data.len() as f64;

    let mean = data.iter().sum::<f64>() / n;
    let rms = (data.iter().map(|&x| x * x).sum::<f64>() / n).sqrt();
    let variance = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let peak_to_peak = max - min;

    Stats {
        mean,
        rms,
        std_dev,
        min,
        max,
        peak_to_peak,
    }
}

fn run_statistics_analysis(output: &mut dyn Write, samples: &[RecordedSample]) -> io::Result<()> {
    let x: Vec<f64> = samples.iter().map(|s| s.sample.x).collect();
    let y: Vec<f64> = samples.iter().map(|s| s.sample.y).collect();
    let z: Vec<f64> = samples.iter().map(|s| s.sample.z).collect();
    let magnitude: Vec<f64> = samples.iter().map(|s| s.magnitude()).collect();

    writeln!(output)?;
    writeln!(output, "Signal Statistics (m/s²):")?;
    writeln!(output, "{:-<80}", "")?;
    writeln!(
        output,
        "{:<10} {:>11} {:>11} {:>11} {:>11} {:>11} {:>11}",
        "Signal", "Mean", "RMS", "Std Dev", "Min", "Max", "Peak-Peak"
    )?;
    writeln!(output, "{:-<80}", "")?;

    write_stats_row(output, "X", &compute_stats(&x))?;
    write_stats_row(output, "Y", &compute_stats(&y))?;
    write_stats_row(output, "Z", &compute_stats(&z))?;
    write_stats_row(output, "Magnitude", &compute_stats(&magnitude))?;

    Ok(())
}

fn write_stats_row(output: &mut dyn Write, label: &str, stats: &Stats) -> io::Result<()> {
    writeln!(
        output,
        "{:<10} {:>11.4} {:>11.4} {:>11.4} {:>11.4} {:>11.4} {:>11.4}",
        label, stats.mean, stats.rms, stats.std_dev, stats.min, stats.max, stats.peak_to_peak
    )
}

// ============================================================================
// SPECTRUM ANALYSIS
// ============================================================================

#[cfg(feature = "analysis")]
fn run_spectrum_analysis(
    output: &mut dyn Write,
    samples: &[RecordedSample],
    sample_rate: f64,
) -> io::Result<()> {
    use num_complex::Complex;
    use rustfft::FftPlanner;
    use std::f64::consts::PI;

    const WINDOW_SIZE: usize = 512;

    struct FrequencyPeak {
        frequency: f64,
        magnitude: f64,
    }

    writeln!(output)?;
    writeln!(output, "FFT Parameters:")?;
    writeln!(output, "  Window size: {} samples", WINDOW_SIZE)?;
    writeln!(output, "  Window type: Hann")?;
    writeln!(
        output,
        "  Frequency resolution: {:.3} Hz",
        sample_rate / WINDOW_SIZE as f64
    )?;
    writeln!(output, "  Max frequency: {:.1} Hz", sample_rate / 2.0)?;
    writeln!(output)?;

    if samples.len() < WINDOW_SIZE {
        writeln!(
            output,
            "Warning: Insufficient samples for FFT (need {}, have {})",
            WINDOW_SIZE,
            samples.len()
        )?;
        return Ok(());
    }

    // Hann-windowed magnitude signal
    let windowed: Vec<f64> = samples[..WINDOW_SIZE]
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let window =
                0.5 * (1.0 - ((2.0 * PI * i as f64) / (WINDOW_SIZE as f64 - 1.0)).cos());
            s.magnitude() * window
        })
        .collect();

    let mut buffer: Vec<Complex<f64>> =
        windowed.iter().map(|&x| Complex::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(WINDOW_SIZE);
    fft.process(&mut buffer);

    // Magnitude spectrum (only first half, as second half is mirror)
    let magnitudes: Vec<f64> = buffer
        .iter()
        .take(WINDOW_SIZE / 2)
        .map(|c| c.norm() / (WINDOW_SIZE as f64))
        .collect();

    // Find peaks (local maxima above 10% of the spectrum maximum)
    let threshold = magnitudes.iter().copied().fold(0.0, f64::max) * 0.1;
    let mut peaks: Vec<FrequencyPeak> = Vec::new();

    for i in 1..magnitudes.len() - 1 {
        if magnitudes[i] > threshold
            && magnitudes[i] > magnitudes[i - 1]
            && magnitudes[i] > magnitudes[i + 1]
        {
            let frequency = (i as f64 * sample_rate) / WINDOW_SIZE as f64;
            peaks.push(FrequencyPeak {
                frequency,
                magnitude: magnitudes[i],
            });
        }
    }

    peaks.sort_by(|a, b| b.magnitude.partial_cmp(&a.magnitude).unwrap());

    writeln!(output, "Magnitude Signal - Top 5 Frequency Peaks:")?;
    if peaks.is_empty() {
        writeln!(output, "  No significant peaks detected")?;
    } else {
        for (i, peak) in peaks.iter().take(5).enumerate() {
            writeln!(
                output,
                "  {}. {:.2} Hz (magnitude: {:.4})",
                i + 1,
                peak.frequency,
                peak.magnitude
            )?;
        }
        // Step cadence cross-check against the zero-crossing estimate.
        let magnitude_signal: Vec<f64> =
            samples[..WINDOW_SIZE].iter().map(|s| s.magnitude()).collect();
        let crossings = gait_classifier::zero_crossings(&magnitude_signal) as f64;
        let zc_estimate = (crossings / 2.0) * sample_rate / WINDOW_SIZE as f64;
        writeln!(output)?;
        writeln!(
            output,
            "Zero-crossing cadence estimate: {:.2} Hz (FFT dominant: {:.2} Hz)",
            zc_estimate, peaks[0].frequency
        )?;
    }

    Ok(())
}
