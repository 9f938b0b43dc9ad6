// recurtrace: replayable call/return tracer for recursive programs

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use recurtrace::presets::{self, Preset};
use recurtrace::replay::{self, FrameStatus};
use recurtrace::trace::EventPayload;
use recurtrace::{EventKind, Executor, ExecutorConfig, Timeline, TraceEvent};

#[derive(Parser)]
#[command(name = "recurtrace")]
#[command(about = "Trace and replay the calls of small recursive C++ programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Executor config file (TOML)
    #[arg(short, long, global = true, env = "RECURTRACE_CONFIG")]
    config: Option<PathBuf>,

    /// Entry routine invoked after the driver statements
    #[arg(long, global = true)]
    entry: Option<String>,

    /// Maximum call depth before a run is stopped
    #[arg(long, global = true)]
    max_depth: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program and print its timeline
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the timeline as JSON
        #[arg(long)]
        json: bool,

        /// Print the recursion tree after the timeline
        #[arg(long)]
        tree: bool,
    },

    /// Print the instrumented form of a program
    Translate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the reconstructed state at one timeline position
    Replay {
        #[command(flatten)]
        source: SourceArgs,

        /// Timeline position (0-based, clamped to the last event)
        #[arg(short, long)]
        step: usize,

        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in presets
    Presets,
}

#[derive(Args)]
struct SourceArgs {
    /// Program source file
    file: Option<PathBuf>,

    /// Preset id (`factorial` or `linear:factorial`); its driver replaces the file's
    #[arg(short, long)]
    preset: Option<String>,

    /// Input literal for the preset driver (defaults to the preset's own)
    #[arg(short, long, requires = "preset")]
    input: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = load_config(&cli)?;
    let executor = Executor::new(config);

    match cli.command {
        Commands::Run { source, json, tree } => {
            let program = load_source(&source)?;
            let result = executor.run_source(&program);
            let timeline = match &result {
                Ok(timeline) => timeline,
                Err(err) => err.partial_timeline(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(timeline)?);
            } else {
                print_timeline(timeline)?;
                if tree {
                    println!();
                    print!("{}", replay::call_tree(timeline));
                }
            }

            match result {
                Ok(timeline) => {
                    if !json {
                        if let Some(value) = timeline.root_result() {
                            println!("{} {}", "Result:".bold(), value);
                        }
                    }
                }
                Err(err) => bail!("Runtime error: {}", err),
            }
        }

        Commands::Translate { source } => {
            let program = recurtrace::translate(&load_source(&source)?);
            print!("{}", program);
            for degradation in program.degradations() {
                eprintln!(
                    "{} line {}: {} ({})",
                    "unsupported".yellow(),
                    degradation.location.line,
                    degradation.text,
                    degradation.reason
                );
            }
        }

        Commands::Replay { source, step, json } => {
            let program = load_source(&source)?;
            let timeline = match executor.run_source(&program) {
                Ok(timeline) => timeline,
                Err(err) => {
                    eprintln!("{} {}", "Runtime error:".red(), err);
                    err.timeline
                }
            };
            let state = replay::reconstruct(&timeline, step);

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print_state(&state, timeline.len());
            }
        }

        Commands::Presets => print_presets(),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ExecutorConfig> {
    let mut config = match &cli.config {
        Some(path) => ExecutorConfig::from_file(path)?,
        None => ExecutorConfig::default(),
    };
    if let Some(entry) = &cli.entry {
        config.entry_point = entry.clone();
    }
    if let Some(depth) = cli.max_depth {
        config.max_call_depth = depth;
    }
    Ok(config)
}

/// Read the file and/or preset into one program
fn load_source(args: &SourceArgs) -> Result<String> {
    let preset = match &args.preset {
        Some(id) => Some(find_preset(id)?),
        None => None,
    };

    let source = match (&args.file, preset) {
        (Some(path), _) => read_file(path)?,
        (None, Some(preset)) => preset.code.to_string(),
        (None, None) => bail!("No input: pass a source file or --preset <ID>"),
    };

    let Some(preset) = preset else {
        return Ok(source);
    };
    let input = args.input.as_deref().unwrap_or(preset.default_input);
    Ok(match preset.driver(input) {
        Some(driver) => presets::with_driver(&source, &driver),
        None => source,
    })
}

fn find_preset(id: &str) -> Result<&'static Preset> {
    presets::find(id).with_context(|| format!("Unknown preset '{}' (see `recurtrace presets`)", id))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("File '{}' not found", path.display()))
}

fn print_timeline(timeline: &Timeline) -> Result<()> {
    let mut out = io::stdout().lock();
    let mut depth = 0usize;

    for (index, event) in timeline.iter().enumerate() {
        if event.is_return() {
            depth = depth.saturating_sub(1);
        }
        let indent = "  ".repeat(depth);
        writeln!(out, "{:>5} {}{}", index, indent, styled(event))?;
        if event.is_call() {
            depth += 1;
        }
    }
    Ok(())
}

fn styled(event: &TraceEvent) -> String {
    let text = event.to_string();
    match event.kind() {
        EventKind::Call => text.green().to_string(),
        EventKind::Return => match &event.payload {
            EventPayload::Return { value, .. } => {
                format!("{} {}", text.magenta(), format!("=> {}", value).bold())
            }
            _ => text.magenta().to_string(),
        },
        EventKind::Line => text.dark_grey().to_string(),
        EventKind::VariableSet => match &event.payload {
            EventPayload::VariableSet { value, .. } => {
                format!("{} {}", text.cyan(), format!("= {}", value).bold())
            }
            _ => text.cyan().to_string(),
        },
        EventKind::Log => text.yellow().to_string(),
    }
}

fn print_state(state: &replay::ReplayState, total: usize) {
    let Some(event) = &state.event else {
        println!("{}", "Empty timeline".dark_grey());
        return;
    };

    println!(
        "{} {}/{}  {}",
        "Step".bold(),
        state.index + 1,
        total,
        event.message
    );
    if let Some(line) = state.current_line {
        println!("{} {}", "Line".bold(), line);
    }

    println!("{}", "Call stack (oldest first):".bold());
    for frame in state.stack() {
        let marker = match frame.status {
            FrameStatus::Active => "  ".to_string(),
            FrameStatus::Returning => "<-".magenta().to_string(),
            FrameStatus::Returned => "  ".to_string(),
        };
        let args: Vec<String> = frame.args.iter().map(|(n, v)| format!("{}={}", n, v)).collect();
        println!(
            "{} {}{}({})",
            marker,
            "  ".repeat(frame.depth),
            frame.name.as_str().green(),
            args.join(", ")
        );
        if !frame.locals.is_empty() {
            println!("   {}locals {}", "  ".repeat(frame.depth), frame.locals);
        }
        if let Some(value) = &frame.return_value {
            println!("   {}returns {}", "  ".repeat(frame.depth), value);
        }
    }

    if !state.output.is_empty() {
        println!("{}", "Output:".bold());
        for line in &state.output {
            println!("  {}", line);
        }
    }
}

fn print_presets() {
    for category in presets::catalog() {
        println!("{} {}", category.name.bold(), format!("({})", category.id).dark_grey());
        println!("  {}", category.description);
        for preset in category.presets {
            println!(
                "  {} {:<30} input: {}",
                format!("{:<16}", preset.id).green(),
                preset.name,
                if preset.default_input.is_empty() {
                    "-"
                } else {
                    preset.default_input
                }
            );
        }
        println!();
    }
}
