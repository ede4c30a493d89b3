//! Signal Calibrator CLI
//!
//! Usage:
//!   calibrator --set f=50,p=75,s=30      # Apply controls and print the result
//!   calibrator --interactive             # Interactive calibration console
//!   calibrator --serve                   # HTTP API server
//!   calibrator --set f=50 --json         # JSON output

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use chrono::Local;
use colored::Colorize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use signal_calibrator::config::{CalibratorConfig, LoadedConfig};
use signal_calibrator::core::{
    apply_paced, decode_state, plan_ambience, run_server, Command, CommandError, CuePlanner,
    ManualClock, SignalEngine,
};
use signal_calibrator::core::commands::HELP;
use signal_calibrator::types::{LogEntry, SignalState};
use signal_calibrator::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "calibrator",
    version = VERSION,
    about = "Dimensional signal calibrator - tune frequency, phase and suppression to lock the signal",
    long_about = "Steer three controls toward their hidden targets until coherence locks.\n\n\
                  Moving a control more than 20 units inside 500 ms drops the signal,\n\
                  as does touching anything while suppression sits above 80 or phase\n\
                  leaves the 20-90 band.\n\n\
                  States:\n  \
                  SEARCHING        - coherence below 60\n  \
                  PATTERN_DETECTED - coherence 60-80\n  \
                  SIGNAL_LOCK      - coherence 80 and above\n  \
                  SIGNAL_LOST      - failure, holds for 2 seconds"
)]
struct Args {
    /// Controls to apply in order, each as a separate move, e.g. "f=50,p=75,s=30"
    #[arg(long)]
    set: Option<String>,

    /// Interactive calibration console
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (overrides config)
    #[arg(long)]
    addr: Option<String>,

    /// Config file (default: $CALIBRATOR_CONFIG or ./calibrator.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show intercept and audio cues with every update
    #[arg(long)]
    verbose: bool,
}

impl Args {
    /// One switch for both stdout (`colored`) and stderr (tracing)
    fn color(&self) -> bool {
        !self.no_color
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // an explicit --config must load; the search path may fall back
    let loaded = match &args.config {
        Some(path) => LoadedConfig {
            config: CalibratorConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            source: Some(path.clone()),
            problems: Vec::new(),
        },
        None => CalibratorConfig::load(),
    };
    let mut config = loaded.config;
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_target(false)
        .with_ansi(args.color())
        .with_writer(io::stderr)
        .init();

    for problem in &loaded.problems {
        warn!(error = %problem, "ignoring config file");
    }
    match &loaded.source {
        Some(path) => info!(path = %path.display(), "config loaded"),
        None => debug!("using default config"),
    }

    if !args.color() {
        colored::control::set_override(false);
    }

    if args.serve {
        print_header("API Server");
        run_server(&config.server).await?;
    } else if let Some(list) = &args.set {
        run_single(list, &args)?;
    } else {
        run_interactive(&args)?;
    }
    Ok(())
}

/// Apply a list of controls and print the final state.
///
/// The list is replayed on a manual clock, one window apart, as if typed.
fn run_single(list: &str, args: &Args) -> Result<()> {
    let commands = Command::parse_list(list).with_context(|| format!("parsing --set '{}'", list))?;
    let clock = ManualClock::starting_at(Local::now().time());
    let mut engine = SignalEngine::with_clock(clock.clone());
    let state = apply_paced(&commands, &mut engine, &clock);

    if args.json {
        #[derive(serde::Serialize)]
        struct SingleOutput<'a> {
            state: &'a SignalState,
            logs: Vec<LogEntry>,
        }
        let out = SingleOutput { state: &state, logs: engine.logs() };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if args.no_color {
        println!("{}", state.to_parseable_string());
    } else {
        println!("{}", state.to_terminal_string());
        if args.verbose {
            print_details(&state);
        }
    }
    Ok(())
}

/// Interactive console
fn run_interactive(args: &Args) -> Result<()> {
    let mut engine = SignalEngine::new();
    let mut planner = CuePlanner::new();
    planner.observe(engine.state());
    let mut shown_log = engine.log().last().map(|e| e.id).unwrap_or(0);

    print_header("Calibration Console");
    println!("Type 'help' for commands. Goal: SIGNAL LOCK (coherence 80%+)");
    println!();
    print_log_entries(&engine.logs());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", format_prompt(engine.state()));
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("{}", e.to_string().yellow());
                continue;
            }
        };

        match command {
            Command::Quit => {
                println!("\nSession ended. Updates: {}", engine.update_count());
                break;
            }
            Command::Help => println!("{}", HELP),
            Command::Logs => print_log_entries(&engine.logs()),
            Command::Intercept => print_details(engine.state()),
            Command::ToggleMute => {
                let muted = planner.toggle_mute();
                println!("audio {}", if muted { "muted" } else { "on" });
            }
            _ => {
                let Some(state) = command.apply(&mut engine) else { continue };

                if args.json {
                    println!("{}", serde_json::to_string(&state)?);
                } else if args.no_color {
                    println!("{}", state.to_parseable_string());
                } else {
                    println!("{}", state.to_terminal_string());
                }

                let fresh: Vec<LogEntry> = engine.logs().into_iter().filter(|e| e.id > shown_log).collect();
                if let Some(last) = fresh.last() {
                    shown_log = last.id;
                }
                print_log_entries(&fresh);

                let change = planner.observe(&state);
                if args.verbose {
                    if let Some(cue) = change.ambience {
                        println!("  ♪ {:?} (loop={}, vol={:.2})", cue.cue, cue.looping, cue.volume);
                    }
                    if let Some(fx) = change.effect {
                        println!("  ♪ {:?}", fx.cue);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_header(mode: &str) {
    println!("{}", "========================================".bold());
    println!("{}", format!("  Signal Calibrator v{} - {}", VERSION, mode).bold());
    println!("{}", "========================================".bold());
    println!();
}

fn format_prompt(state: &SignalState) -> String {
    format!(
        "{} [{} {}%] > ",
        state.status.glyph().color(state.status.color()),
        state.status.label().color(state.status.color()),
        state.coherence_percent(),
    )
}

fn print_log_entries(entries: &[LogEntry]) {
    for entry in entries {
        println!(
            "  {} {}",
            format!("[{}]", entry.timestamp).dimmed(),
            entry.message.color(entry.severity.color()),
        );
    }
}

/// Intercept panel and current ambience
fn print_details(state: &SignalState) {
    let intercept = decode_state(state);
    println!("  [SIGNAL INTERCEPT]");
    println!("  COHERENCE:   {}", format!("{}%", state.coherence_percent()).color(state.coherence_color()));
    println!("  LOCATION:    {}", intercept.location);
    println!("  EVENT TYPE:  {}", intercept.event_type);
    println!("  TIME OFFSET: {}", intercept.time_offset);
    if intercept.decoded {
        println!("  {}", "✓ SIGNAL DECODED SUCCESSFULLY".green());
    }
    let cue = plan_ambience(state);
    println!("  {}", format!("ambience: {:?} (vol {:.2})", cue.cue, cue.volume).dimmed());
}
