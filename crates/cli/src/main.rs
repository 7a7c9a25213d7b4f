// tabula CLI - headless replay of action scripts

mod exit_codes;
mod replay;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tabula_command::ActionKind;
use tabula_config::Settings;
use tabula_engine::Workbook;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use exit_codes::{EXIT_IO, EXIT_REPLAY_MISMATCH, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Replay spreadsheet action scripts with undo/redo")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "TABULA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSONL action script against a workbook
    #[command(after_help = "\
Examples:
  tabula replay edits.jsonl
  tabula replay edits.jsonl --workbook book.json -o book.json
  tabula replay edits.jsonl --fingerprint
  tabula replay edits.jsonl --expect v1:12:0123...
  tabula replay edits.jsonl --json --strict")]
    Replay {
        /// Script file, one step per line
        script: PathBuf,

        /// Starting workbook (saved earlier with -o); a fresh one otherwise
        #[arg(long)]
        workbook: Option<PathBuf>,

        /// Write the final workbook as JSON
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Only print the fingerprint
        #[arg(long)]
        fingerprint: bool,

        /// Fail unless the final fingerprint matches
        #[arg(long, value_name = "FINGERPRINT")]
        expect: Option<String>,

        /// Fail on the first rejected step or dropped history entry
        #[arg(long)]
        strict: bool,

        /// History cap (overrides history.maxDepth; 0 keeps no history)
        #[arg(long)]
        max_history: Option<usize>,

        /// Suppress the summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// List the supported action kinds
    Kinds {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ncommand: tabula-command ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    init_tracing(&settings);

    let result = match cli.command {
        Commands::Replay { script, workbook, output, json, fingerprint, expect, strict, max_history, quiet } => {
            let options = replay::ReplayOptions {
                strict: strict || settings.replay_strict,
                max_history: max_history.or(settings.history_max_depth),
            };
            cmd_replay(script, workbook, output, json, fingerprint, expect, options, quiet)
        }
        Commands::Kinds { json } => cmd_kinds(json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_env("TABULA_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("tabula=info,warn"));

    let format = env::var("TABULA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr)).init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_replay(
    script: PathBuf,
    workbook: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
    fingerprint_only: bool,
    expect: Option<String>,
    options: replay::ReplayOptions,
    quiet: bool,
) -> Result<(), CliError> {
    if json && fingerprint_only {
        return Err(CliError::args("--json and --fingerprint cannot be combined")
            .with_hint("the JSON report already includes the fingerprint"));
    }

    let expected = match expect.as_deref() {
        Some(s) => Some(replay::ReplayFingerprint::parse(s).ok_or_else(|| {
            CliError::args(format!("invalid fingerprint '{}'", s)).with_hint("expected v1:<steps>:<32 hex digits>")
        })?),
        None => None,
    };

    let start = match workbook {
        Some(path) => replay::load_workbook(&path)?,
        None => Workbook::new(),
    };
    let outcome = replay::execute_script(&script, start, options)?;

    if let Some(path) = output {
        replay::save_workbook(&outcome.workbook, &path)?;
    }

    let report = &outcome.report;
    let mismatch = expected.filter(|fp| fp.to_string() != report.fingerprint);

    if let Some(expected) = mismatch {
        return Err(CliError::new(
            EXIT_REPLAY_MISMATCH,
            format!("fingerprint mismatch: expected {}, got {}", expected, report.fingerprint),
        )
        .with_hint("the script or the starting workbook changed since the fingerprint was recorded"));
    }

    if fingerprint_only {
        println!("{}", report.fingerprint);
        return Ok(());
    }
    if json {
        let out = serde_json::to_string_pretty(report).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if !quiet {
        eprintln!("Replayed {} steps", report.steps);
        eprintln!(
            "  invoked {}, rejected {}, undone {}, redone {}, dropped {}",
            report.invoked, report.rejected, report.undone, report.redone, report.dropped
        );
        if report.empty_history > 0 {
            eprintln!("  {} undo/redo step(s) found empty history", report.empty_history);
        }
        eprintln!("  can undo: {}, can redo: {}", report.can_undo, report.can_redo);
        eprintln!("Fingerprint: {}", report.fingerprint);
    }
    Ok(())
}

#[derive(Serialize)]
struct KindInfo {
    kind: &'static str,
    description: &'static str,
}

fn cmd_kinds(json: bool) -> Result<(), CliError> {
    let kinds: Vec<KindInfo> = ActionKind::ALL
        .iter()
        .map(|k| KindInfo { kind: k.as_str(), description: k.describe() })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&kinds).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
    } else {
        let width = kinds.iter().map(|k| k.kind.len()).max().unwrap_or(0);
        for k in &kinds {
            println!("{:width$}  {}", k.kind, k.description, width = width);
        }
    }
    Ok(())
}
