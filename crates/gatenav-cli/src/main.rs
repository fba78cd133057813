//! `gatenav` – gate navigation command emitter.
//!
//! Reads marker detections (one JSON array per frame) from stdin or a file,
//! decides a one-byte steering command per frame and writes it to the motor
//! controller's serial link.  Ctrl-C stops the loop after the frame in
//! progress.

mod config;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use gatenav_hal::{ByteSink, JsonLinesSource, MarkerSource, SerialSink};
use gatenav_perception::GateEngine;
use gatenav_runtime::{LoopStats, NavigationLoop, init_tracing};

use config::{Config, STDIN_INPUT, STDOUT_OUTPUT};

const ENV_HELP: &str = "\
Environment:
  GATENAV_CONFIG       Config file path (default ~/.gatenav/config.toml)
  GATENAV_INPUT        Detection input (\"-\" for stdin)
  GATENAV_OUTPUT       Serial device or \"stdout\"
  GATENAV_BAUD_RATE    Serial line speed
  GATENAV_FRAME_WIDTH  Camera frame width in pixels
  GATENAV_LOG_FORMAT   \"json\" for JSON logs
  RUST_LOG             Log filter (default \"info\")";

#[derive(Parser, Debug)]
#[command(name = "gatenav")]
#[command(about = "Steer a rover through marker gates, one command byte per camera frame")]
#[command(version, after_help = ENV_HELP)]
struct Cli {
    // `None` runs the loop with config values.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Run the navigation loop.
    Run(RunArgs),

    /// Write the default config file if none exists.
    Init,
}

/// Per-run overrides, applied on top of the config file and environment.
#[derive(Args, Debug, Default, PartialEq)]
struct RunArgs {
    /// Detection input: "-" for stdin, or a file/FIFO of JSON lines.
    #[arg(long)]
    input: Option<String>,

    /// Serial device for command bytes, or "stdout".
    #[arg(long)]
    output: Option<String>,

    /// Serial line speed.
    #[arg(long)]
    baud_rate: Option<u32>,
}

impl RunArgs {
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(input) = &self.input {
            cfg.input = input.clone();
        }
        if let Some(output) = &self.output {
            cfg.output = output.clone();
        }
        if let Some(baud) = self.baud_rate {
            cfg.baud_rate = baud;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Command::Run(RunArgs::default()));

    let loaded = config::load();
    let mut cfg = loaded.clone().ok().flatten().unwrap_or_default();
    config::apply_env_overrides(&mut cfg);
    if let Command::Run(args) = &command {
        args.apply_to(&mut cfg);
    }

    // Hold the guard until exit so pending spans are flushed.
    let _telemetry = init_tracing("gatenav", &cfg.engine);

    match command {
        Command::Run(_) => run(cfg, loaded),
        Command::Init => init(loaded),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn run(cfg: Config, loaded: Result<Option<Config>, String>) -> ExitCode {
    print_banner();

    let path = config::config_path();
    match loaded {
        Ok(Some(_)) => info!(path = %path.display(), "config loaded"),
        Ok(None) => info!(path = %path.display(), "no config file; using defaults"),
        Err(e) => warn!(error = %e, "config unreadable; using defaults"),
    }

    let engine = match GateEngine::new(cfg.engine.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let source: Box<dyn MarkerSource> = if cfg.input == STDIN_INPUT {
        Box::new(JsonLinesSource::stdin())
    } else {
        match JsonLinesSource::open(&cfg.input) {
            Ok(src) => Box::new(src),
            Err(e) => {
                error!(error = %e, "cannot open detection input");
                return ExitCode::FAILURE;
            }
        }
    };

    let sink: Box<dyn ByteSink> = if cfg.output == STDOUT_OUTPUT {
        Box::new(SerialSink::stdout())
    } else {
        match SerialSink::open(&cfg.output, cfg.baud_rate) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                error!(error = %e, "cannot open command output");
                return ExitCode::FAILURE;
            }
        }
    };

    // ── Shutdown flag ─────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", "⚠  Ctrl-C received – stopping after the current frame …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    let mut nav = NavigationLoop::new(engine, source, sink);
    let stats = nav.run(&shutdown);
    print_summary(&stats);

    ExitCode::SUCCESS
}

fn init(loaded: Result<Option<Config>, String>) -> ExitCode {
    let path = config::config_path();
    match loaded {
        Ok(Some(_)) => {
            eprintln!(
                "  {} {} already exists; leaving it untouched.",
                "•".yellow(),
                path.display().to_string().bold()
            );
            return ExitCode::SUCCESS;
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    }

    match config::save(&Config::default()) {
        Ok(()) => {
            eprintln!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

// Everything user-facing goes to stderr; stdout may be the command stream.

fn print_banner() {
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("  {} {}", "GateNav".bold().cyan(), version.dimmed());
    eprintln!("  Marker-gate steering for the rover");
    eprintln!();
}

fn print_summary(stats: &LoopStats) {
    eprintln!();
    eprintln!("{}", "  Run summary".bold());
    eprintln!("    frames            {}", stats.frames);
    eprintln!("    gates passed      {}", stats.gates_passed.to_string().green());
    eprintln!("    gate frames       {}", stats.gate_frames);
    eprintln!("    start / goal      {} / {}", stats.start_frames, stats.goal_frames);
    eprintln!("    uncertain         {}", stats.uncertain_frames);
    eprintln!("    bytes sent        {}", stats.bytes_sent);
    if stats.sink_failures + stats.capture_failures > 0 {
        eprintln!(
            "    {}  sink {} / capture {}",
            "failures".red(),
            stats.sink_failures,
            stats.capture_failures
        );
    }
    if stats.unrecognized_markers > 0 {
        eprintln!("    unrecognized ids  {}", stats.unrecognized_markers.to_string().yellow());
    }
}
