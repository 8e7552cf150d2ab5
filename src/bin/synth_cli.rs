use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use audio_synthesizer::error::ErrorCode;
use audio_synthesizer::telemetry::TelemetryEvent;
use audio_synthesizer::testing::RecordingBackend;
use audio_synthesizer::{
    apply_parameters, build_synthesizer, AppConfig, AudioSynthesizer, ControllerConfig,
    SynthCommand, SynthController, SynthError, Waveform,
};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Parser, Debug)]
#[command(
    name = "synth_cli",
    about = "Lifecycle and concurrency harness for the audio synthesizer controller"
)]
struct Cli {
    /// Configuration file (defaults to assets/synth_config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk through play, background, foreground and stop, printing telemetry
    Demo,
    /// Run a JSON list of lifecycle signals and commands against the configured synthesizer
    Script {
        #[arg(long)]
        file: PathBuf,
    },
    /// Hammer one controller with concurrent commands and lifecycle toggles
    Stress {
        #[arg(long, default_value_t = 8)]
        tasks: usize,
        #[arg(long, default_value_t = 200)]
        iterations: usize,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Simulated latency of every engine call, in microseconds
        #[arg(long, default_value_t = 50)]
        call_delay_us: u64,
    },
}

fn main() -> ExitCode {
    audio_synthesizer::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load_platform);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    match cli.command {
        Commands::Demo => runtime.block_on(run_demo(&config)),
        Commands::Script { file } => runtime.block_on(run_script(&config, &file)),
        Commands::Stress {
            tasks,
            iterations,
            seed,
            call_delay_us,
        } => runtime.block_on(run_stress(
            &config.controller,
            tasks,
            iterations,
            seed,
            Duration::from_micros(call_delay_us),
        )),
    }
}

// ============================================================================
// DEMO
// ============================================================================

async fn run_demo(config: &AppConfig) -> Result<ExitCode> {
    let synth = build_synthesizer(config).context("building synthesizer")?;
    let mut events = synth.telemetry();
    let parameters = config.synthesizer.initial_parameters;

    apply_parameters(synth.as_ref(), &parameters).await?;
    synth.play().await?;
    println!("playing: {}", synth.is_playing().await?);

    synth.on_pause().await?;
    println!("backgrounded");

    synth.on_resume().await?;
    apply_parameters(synth.as_ref(), &parameters).await?;
    println!("foregrounded, playing: {}", synth.is_playing().await?);

    synth.stop().await?;
    synth.shutdown().await?;

    if let Some(events) = events.as_mut() {
        for event in drain_events(events) {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(ExitCode::from(0))
}

// ============================================================================
// SCRIPT
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum LifecycleSignal {
    Resume,
    Pause,
}

/// One line of a script: `{"lifecycle": "pause"}` or `{"command": "play"}`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(untagged)]
enum ScriptStep {
    Lifecycle { lifecycle: LifecycleSignal },
    Command(SynthCommand),
}

#[derive(Serialize)]
struct StepReport {
    step: usize,
    action: ScriptStep,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    playing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn run_script(config: &AppConfig, file: &Path) -> Result<ExitCode> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let steps: Vec<ScriptStep> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;

    let synth = build_synthesizer(config).context("building synthesizer")?;
    let mut failures = 0usize;

    for (index, step) in steps.iter().enumerate() {
        let outcome = match *step {
            ScriptStep::Lifecycle {
                lifecycle: LifecycleSignal::Resume,
            } => synth.on_resume().await.map(|_| None),
            ScriptStep::Lifecycle {
                lifecycle: LifecycleSignal::Pause,
            } => synth.on_pause().await.map(|_| None),
            ScriptStep::Command(command) => run_command(synth.as_ref(), command).await,
        };

        let report = step_report(index, *step, outcome);
        if !report.ok {
            failures += 1;
        }
        println!("{}", serde_json::to_string(&report)?);
    }

    synth.shutdown().await?;
    Ok(if failures == 0 {
        ExitCode::from(0)
    } else {
        ExitCode::from(2)
    })
}

/// Issue one scripted command; `Some(flag)` for playback queries.
async fn run_command(
    synth: &dyn AudioSynthesizer,
    command: SynthCommand,
) -> Result<Option<bool>, SynthError> {
    match command {
        SynthCommand::Play => synth.play().await.map(|_| None),
        SynthCommand::Stop => synth.stop().await.map(|_| None),
        SynthCommand::IsPlaying => synth.is_playing().await.map(Some),
        SynthCommand::SetFrequency { hz } => synth.set_frequency(hz).await.map(|_| None),
        SynthCommand::SetVolume { db } => synth.set_volume(db).await.map(|_| None),
        SynthCommand::SetWaveform { waveform } => {
            synth.set_waveform(waveform).await.map(|_| None)
        }
    }
}

fn step_report(
    step: usize,
    action: ScriptStep,
    outcome: Result<Option<bool>, SynthError>,
) -> StepReport {
    match outcome {
        Ok(playing) => StepReport {
            step,
            action,
            ok: true,
            playing,
            error_code: None,
            error: None,
        },
        Err(err) => StepReport {
            step,
            action,
            ok: false,
            playing: None,
            error_code: Some(err.code()),
            error: Some(err.message()),
        },
    }
}

// ============================================================================
// STRESS
// ============================================================================

#[derive(Serialize)]
struct StressReport {
    tasks: usize,
    iterations: usize,
    seed: u64,
    operations: usize,
    failures: usize,
    create_count: usize,
    destroy_count: usize,
    live_after_shutdown: usize,
    max_in_flight: usize,
    overlap_detected: bool,
    violations: Vec<String>,
}

impl StressReport {
    fn passed(&self) -> bool {
        !self.overlap_detected
            && self.max_in_flight <= 1
            && self.violations.is_empty()
            && self.live_after_shutdown == 0
            && self.create_count == self.destroy_count
    }
}

async fn run_stress(
    config: &ControllerConfig,
    tasks: usize,
    iterations: usize,
    seed: u64,
    call_delay: Duration,
) -> Result<ExitCode> {
    tracing::info!(tasks, iterations, seed, ?call_delay, "starting stress run");
    let backend = RecordingBackend::new();
    backend.recorder().set_call_delay(call_delay);
    let worker_backend = backend.clone();
    let controller = Arc::new(
        SynthController::spawn(move || worker_backend, config).context("starting controller")?,
    );

    let mut workers = Vec::with_capacity(tasks);
    for task in 0..tasks {
        let controller = Arc::clone(&controller);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(task as u64));
        workers.push(tokio::spawn(async move {
            let mut failures = 0usize;
            for _ in 0..iterations {
                if random_step(&controller, &mut rng).await.is_err() {
                    failures += 1;
                }
            }
            failures
        }));
    }

    let mut failures = 0usize;
    for worker in workers {
        failures += worker.await.context("stress task panicked")?;
    }
    controller.shutdown().await?;

    let recorder = backend.recorder();
    let report = StressReport {
        tasks,
        iterations,
        seed,
        operations: tasks * iterations,
        failures,
        create_count: recorder.create_count(),
        destroy_count: recorder.destroy_count(),
        live_after_shutdown: recorder.live_count(),
        max_in_flight: recorder.max_in_flight(),
        overlap_detected: recorder.overlap_detected(),
        violations: recorder.violations(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.passed() {
        ExitCode::from(0)
    } else {
        ExitCode::from(2)
    })
}

async fn random_step(controller: &SynthController, rng: &mut StdRng) -> Result<(), SynthError> {
    match rng.gen_range(0..8) {
        0 => controller.play().await,
        1 => controller.stop().await,
        2 => controller.is_playing().await.map(|_| ()),
        3 => controller.set_frequency(rng.gen_range(20.0..2000.0)).await,
        4 => controller.set_volume(rng.gen_range(-60.0..0.0)).await,
        5 => {
            let waveform = Waveform::ALL[rng.gen_range(0..Waveform::ALL.len())];
            controller.set_waveform(waveform).await
        }
        6 => controller.on_resume().await,
        _ => controller.on_pause().await,
    }
}

fn drain_events(events: &mut broadcast::Receiver<TelemetryEvent>) -> Vec<TelemetryEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                eprintln!("telemetry lagged, {skipped} events dropped");
            }
            Err(_) => break,
        }
    }
    drained
}

