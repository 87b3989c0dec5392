//! SenseAware CLI - drive the classification engine from the terminal
//!
//! Commands:
//! - run: classify NDJSON sensor events from stdin (streaming mode)
//! - simulate: generate and classify a synthetic session
//! - schema: print the wire formats

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use senseaware::config::{EngineConfig, Settings};
use senseaware::pipeline::{SensorPipeline, SourceAvailability};
use senseaware::sim::SimulatedNoiseSource;
use senseaware::types::SensorEvent;
use senseaware::{EngineError, ENGINE_VERSION};

/// SenseAware - classify handheld sensor streams into activity and
/// environment states
#[derive(Parser)]
#[command(name = "sense")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Classify handheld sensor streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify NDJSON sensor events from stdin (streaming mode)
    Run {
        /// Engine configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Settings file (JSON); defaults apply when omitted
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Write the session history to this file on exit
        #[arg(long)]
        history_out: Option<PathBuf>,

        /// Flush output after each reading
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Generate and classify a synthetic session
    Simulate {
        /// Number of motion ticks to generate
        #[arg(long, default_value = "300")]
        ticks: u64,

        /// RNG seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the wire formats
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            config,
            settings,
            history_out,
            flush,
        } => cmd_run(
            config.as_deref(),
            settings.as_deref(),
            history_out.as_deref(),
            flush,
        ),
        Commands::Simulate { ticks, seed } => cmd_simulate(ticks, seed),
        Commands::Schema => {
            cmd_schema();
            Ok(())
        }
    }
}

fn cmd_run(
    config_path: Option<&std::path::Path>,
    settings_path: Option<&std::path::Path>,
    history_out: Option<&std::path::Path>,
    flush: bool,
) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let settings = match settings_path {
        Some(path) => Settings::from_json(&fs::read_to_string(path)?)?,
        None => Settings::default(),
    };

    if atty::is(atty::Stream::Stdin) {
        eprintln!("reading NDJSON sensor events from stdin; pipe events or press Ctrl-D");
    }

    let mut pipeline = SensorPipeline::new(config, settings);
    pipeline.subscribe(SourceAvailability::default(), |_| {});

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: SensorEvent = serde_json::from_str(trimmed)
            .map_err(|e| CliError::Parse(format!("bad event {trimmed:?}: {e}")))?;

        if let Some(tick) = pipeline.handle_event(&event) {
            writeln!(stdout, "{}", serde_json::to_string(&tick)?)?;
            if flush {
                stdout.flush()?;
            }
        }
    }

    let totals = pipeline.totals_at(Utc::now());
    eprintln!(
        "session totals: active {}m, rest {}m, {} readings stored",
        totals.active_minutes(),
        totals.rest_minutes(),
        pipeline.history().len()
    );

    if let Some(path) = history_out {
        let history = serde_json::to_string_pretty(&pipeline.history())?;
        fs::write(path, history)?;
    }

    pipeline.unsubscribe();
    Ok(())
}

fn cmd_simulate(ticks: u64, seed: Option<u64>) -> Result<(), CliError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut noise = match seed {
        Some(seed) => SimulatedNoiseSource::with_seed(seed),
        None => SimulatedNoiseSource::new(),
    };

    let mut pipeline = SensorPipeline::default();
    pipeline.subscribe(SourceAvailability::default(), |_| {});

    let interval = Duration::milliseconds(pipeline.config().motion_sample_interval_ms as i64);
    let start = Utc::now();
    let mut stdout = io::stdout();

    // Three phases of equal length: still, walking, running.
    let phase_len = (ticks / 3).max(1);

    for i in 0..ticks {
        let timestamp = start + interval * i as i32;

        // Jitter amplitude per phase, tuned to land inside the default
        // variance bands.
        let amplitude = match i / phase_len {
            0 => 0.05,
            1 => 0.45,
            _ => 1.2,
        };
        let magnitude = 1.0 + (rng.gen::<f64>() - 0.5) * 2.0 * amplitude;

        pipeline.handle_noise(noise.next_level());
        pipeline.handle_light(50.0 + rng.gen::<f64>() * 30.0);
        pipeline.handle_gravity(senseaware::types::GravityVector::new(0.0, -0.95, 0.1));

        let event = SensorEvent::Accel {
            x: magnitude,
            y: 0.0,
            z: 0.0,
            timestamp,
        };
        if let Some(tick) = pipeline.handle_event(&event) {
            writeln!(stdout, "{}", serde_json::to_string(&tick)?)?;
        }
    }

    let end = start + interval * ticks as i32;
    let totals = pipeline.totals_at(end);
    eprintln!(
        "simulated {} ticks: active {}m, rest {}m",
        ticks,
        totals.active_minutes(),
        totals.rest_minutes()
    );

    pipeline.unsubscribe();
    Ok(())
}

fn cmd_schema() {
    println!("Input: NDJSON, one sensor event per line");
    println!();
    println!("  {{\"sensor\":\"accel\",\"x\":..,\"y\":..,\"z\":..,\"timestamp\":\"..\"}}");
    println!("      drives one classification tick (g units, RFC 3339 time)");
    println!("  {{\"sensor\":\"light\",\"illuminance\":..}}");
    println!("      refreshes the cached light level (lux)");
    println!("  {{\"sensor\":\"noise\",\"level\":..}}");
    println!("      refreshes the cached loudness (dB)");
    println!("  {{\"sensor\":\"gravity\",\"x\":..,\"y\":..,\"z\":..}}");
    println!("      refreshes the cached orientation (g units)");
    println!();
    println!("Output: NDJSON, one tick per motion event");
    println!();
    println!("  {{\"reading\":{{\"activity\":..,\"light\":..,\"noise\":..,");
    println!("    \"orientation\":..,\"timestamp\":..}},\"alerts\":[..]}}");
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    Parse(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Json(e) => write!(f, "{e}"),
            CliError::Parse(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
