//! Gait monitor - live walking/running classification display
//!
//! Feeds accelerometer samples into the gait monitor at their nominal
//! cadence, from either a synthetic activity schedule or a recorded CSV
//! file, and redraws a console status screen as windows are classified.
//!
//! Usage:
//!   gait-monitor --simulate walking:30,running:30 --rate 50
//!   gait-monitor --input walk.csv --window 10

use clap::Parser;
use gait_classifier::{
    meter, signed_bar, Classification, GaitMonitor, GaitProfile, MonitorConfig, Recording,
    RecordingWriter, SignalGenerator, TimeKeeper, WindowReport,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "gait-monitor")]
#[command(about = "Classify walking vs. running from accelerometer data", long_about = None)]
struct Args {
    /// CSV recording to replay instead of simulating
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Activity schedule, e.g. "walking:30,running:30" (seconds per segment)
    #[arg(short, long, default_value = "walking:30,running:30")]
    simulate: String,

    /// Sample rate in Hz for simulated input (1-1000)
    #[arg(short, long, default_value = "50")]
    rate: u32,

    /// Window period in seconds
    #[arg(short, long, default_value = "10")]
    window: u64,

    /// Record the fed samples to a CSV file (simulation only)
    #[arg(long)]
    record: Option<PathBuf>,
}

/// One segment of the simulated schedule.
struct Segment {
    profile: GaitProfile,
    duration: Duration,
}

fn parse_schedule(schedule: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    for part in schedule.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, seconds) = match part.split_once(':') {
            Some((name, secs)) => {
                let seconds: f64 = secs
                    .trim()
                    .parse()
                    .map_err(|_| format!("bad duration in segment '{}'", part))?;
                if seconds <= 0.0 {
                    return Err(format!("segment '{}' must have a positive duration", part));
                }
                (name, seconds)
            }
            None => (part, 30.0),
        };
        let profile: GaitProfile = name
            .parse()
            .map_err(|e| format!("{}", e))?;
        segments.push(Segment {
            profile,
            duration: Duration::from_secs_f64(seconds),
        });
    }
    if segments.is_empty() {
        return Err("schedule is empty".to_string());
    }
    Ok(segments)
}

/// Window totals and the latest report, shared with the evaluator callback.
#[derive(Default)]
struct Status {
    latest: Option<WindowReport>,
    walking_windows: u64,
    running_windows: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Validate arguments
    if args.rate < 1 || args.rate > 1000 {
        eprintln!("Error: rate must be 1-1000 Hz");
        std::process::exit(1);
    }
    if args.window == 0 {
        eprintln!("Error: window must be at least 1 second");
        std::process::exit(1);
    }
    if args.record.is_some() && args.input.is_some() {
        eprintln!("Error: --record only applies to simulated input");
        std::process::exit(1);
    }

    println!("Gait Monitor");
    println!("============");
    match &args.input {
        Some(path) => println!("Input: {}", path.display()),
        None => println!("Simulating: {}", args.simulate),
    }
    println!("Window: {} s", args.window);
    println!();

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let status = Arc::new(Mutex::new(Status::default()));
    let callback_status = status.clone();

    let config = MonitorConfig {
        window: Duration::from_secs(args.window),
        ..MonitorConfig::default()
    };
    let monitor = GaitMonitor::start(config, move |report| {
        let mut status = callback_status.lock().unwrap();
        match report.classification {
            Classification::Walking => status.walking_windows += 1,
            Classification::Running => status.running_windows += 1,
        }
        status.latest = Some(report);
    })?;
    let feed = monitor.feed();

    // Clear screen once at start
    print!("\x1B[2J\x1B[H");
    io::stdout().flush()?;

    let keeper = TimeKeeper::new();
    let result = match &args.input {
        Some(path) => replay(path, &feed, &status, &running, &keeper),
        None => simulate(&args, &feed, &status, &running, &keeper),
    };

    monitor.stop();

    match result {
        Ok(samples_fed) => {
            let status = status.lock().unwrap();
            let total_windows = status.walking_windows + status.running_windows;
            println!("\nMonitoring complete!");
            println!("Elapsed time: {:.1} s", keeper.elapsed_secs());
            println!("Samples fed: {}", samples_fed);
            println!(
                "Windows: {} ({} walking, {} running)",
                total_windows, status.walking_windows, status.running_windows
            );
            if feed.rejected_samples() > 0 {
                println!("Rejected non-finite samples: {}", feed.rejected_samples());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("\nError: {}", e);
            Err(e)
        }
    }
}

/// Feed the synthetic schedule at the configured rate.
fn simulate(
    args: &Args,
    feed: &gait_classifier::SampleFeed,
    status: &Arc<Mutex<Status>>,
    running: &Arc<AtomicBool>,
    keeper: &TimeKeeper,
) -> Result<u64, Box<dyn std::error::Error>> {
    let segments = parse_schedule(&args.simulate).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    let rate = args.rate as f64;
    let interval = Duration::from_secs_f64(1.0 / rate);

    let mut recorder = match &args.record {
        Some(path) => Some(RecordingWriter::create(path, rate)?),
        None => None,
    };

    let mut samples_fed = 0u64;
    let mut last_window_index = None;
    let mut next_sample_time = Instant::now();

    'schedule: for segment in &segments {
        let generator = SignalGenerator::new(segment.profile, rate)?;
        let segment_samples = (segment.duration.as_secs_f64() * rate) as u64;

        for n in 0..segment_samples {
            if !running.load(Ordering::SeqCst) {
                break 'schedule;
            }

            let sample = generator.sample_at(n);
            feed.push(sample);
            if let Some(recorder) = recorder.as_mut() {
                recorder.append(samples_fed as f64 / rate, sample)?;
            }
            samples_fed += 1;

            redraw(
                keeper,
                samples_fed,
                sample.magnitude(),
                status,
                &mut last_window_index,
                Some(segment.profile),
            )?;

            next_sample_time += interval;
            let now = Instant::now();
            if next_sample_time > now {
                std::thread::sleep(next_sample_time - now);
            }
        }
    }

    if let Some(recorder) = recorder.as_mut() {
        recorder.flush()?;
    }
    Ok(samples_fed)
}

/// Replay a recorded CSV at its own timestamps.
fn replay(
    path: &Path,
    feed: &gait_classifier::SampleFeed,
    status: &Arc<Mutex<Status>>,
    running: &Arc<AtomicBool>,
    keeper: &TimeKeeper,
) -> Result<u64, Box<dyn std::error::Error>> {
    let recording = Recording::load(path)?;
    if recording.is_empty() {
        eprintln!("Warning: recording is empty");
        return Ok(0);
    }

    let start = Instant::now();
    let base = recording.samples[0].timestamp;
    let mut samples_fed = 0u64;
    let mut last_window_index = None;

    for recorded in &recording.samples {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        // Pace by the recorded timeline, not the arrival loop.
        let due = start + Duration::from_secs_f64(recorded.timestamp - base);
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }

        feed.push(recorded.sample);
        samples_fed += 1;

        redraw(
            keeper,
            samples_fed,
            recorded.magnitude(),
            status,
            &mut last_window_index,
            None,
        )?;
    }

    Ok(samples_fed)
}

/// Redraw the status screen, ringing the bell once per new running window.
fn redraw(
    keeper: &TimeKeeper,
    samples_fed: u64,
    magnitude: f64,
    status: &Arc<Mutex<Status>>,
    last_window_index: &mut Option<u64>,
    profile: Option<GaitProfile>,
) -> io::Result<()> {
    let status = status.lock().unwrap();
    let elapsed = keeper.elapsed_secs();
    let rate = if elapsed > 0.0 {
        samples_fed as f64 / elapsed
    } else {
        0.0
    };

    // Move cursor to top without clearing (reduces flicker)
    print!("\x1B[H");

    println!("Gait Monitor - Live                                             ");
    println!("===================                                             ");
    println!(
        "Time: {:.1}s | Samples: {} | Rate: {:.1} Hz                    ",
        elapsed, samples_fed, rate
    );
    if let Some(profile) = profile {
        println!("Feeding: {}                                                 ", profile);
    }
    println!();

    println!("MAGNITUDE (m/s²)                  -12 ◄─────────┼─────────► +12");
    println!("  {:7.2}      [{}]", magnitude, signed_bar(magnitude, 12.0, 40));
    println!();

    match &status.latest {
        Some(report) => {
            let label = report.classification.to_string().to_uppercase();
            println!(
                "ACTIVITY: {:10}  (window {}, {} samples, score {:7.2})       ",
                label, report.window_index, report.sample_count, report.score
            );
            println!(
                "  Energy:    {:7.2} [{}]",
                report.features.energy,
                meter(report.features.energy, 150.0, 40)
            );
            println!(
                "  Frequency: {:7.2} [{}]",
                report.features.frequency,
                meter(report.features.frequency, 30.0, 40)
            );
        }
        None => {
            println!("ACTIVITY: waiting for first window...                           ");
            println!();
            println!();
        }
    }

    println!();
    println!(
        "Windows: {} walking, {} running                                 ",
        status.walking_windows, status.running_windows
    );
    println!("Press Ctrl+C to exit                                            ");

    // Audible alert, once per newly classified running window.
    if let Some(report) = &status.latest {
        if Some(report.window_index) != *last_window_index {
            *last_window_index = Some(report.window_index);
            if report.classification.is_running() {
                print!("\x07");
            }
        }
    }

    io::stdout().flush()
}
