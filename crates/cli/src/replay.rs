//! Script replay: run a JSONL action script against a workbook headlessly.
//!
//! Usage: tabula replay script.jsonl [--workbook in.json] [-o out.json]
//!
//! Each non-blank line is one step:
//!
//! ```text
//! {"op":"invoke","label":"Header","actions":[{"sheet_id":1,"kind":"set_frozen_rows","count":1}]}
//! {"op":"undo"}
//! {"op":"redo"}
//! {"op":"add_sheet","name":"Data"}
//! {"op":"delete_sheet","sheet_id":2}
//! ```
//!
//! Lines starting with `#` are comments. Sheet management steps act on the
//! workbook directly and are not recorded in history.
//!
//! ## Fingerprint Versioning
//!
//! Fingerprints are prefixed with a version (e.g., `v1:6:abc123...`): the
//! number of steps, then a hash of the final workbook. Fingerprints are stable
//! within the same major version. Breaking changes to fingerprint computation
//! will increment the version.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tabula_command::{ActionData, Command, CommandError, Document, HistoryStep};
use tabula_engine::{SheetId, Workbook};
use tracing::{debug, info, warn};

use crate::exit_codes::{EXIT_REPLAY_DROPPED, EXIT_REPLAY_PARSE, EXIT_REPLAY_REJECTED};
use crate::CliError;

/// Fingerprint format version. Increment on breaking changes to fingerprint computation.
pub const FINGERPRINT_VERSION: &str = "v1";

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Invoke {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        actions: Vec<ActionData>,
    },
    Undo,
    Redo,
    AddSheet {
        name: String,
    },
    DeleteSheet {
        sheet_id: SheetId,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Stop at the first rejected step or dropped entry.
    pub strict: bool,
    /// History cap; `None` keeps every entry.
    pub max_history: Option<usize>,
}

/// Fingerprint for replay verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayFingerprint {
    pub len: usize,
    pub hash_hi: u64,
    pub hash_lo: u64,
}

impl ReplayFingerprint {
    /// Create a new fingerprint from a step count and hash.
    pub fn new(len: usize, hash: [u8; 16]) -> Self {
        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        hi.copy_from_slice(&hash[0..8]);
        lo.copy_from_slice(&hash[8..16]);
        Self { len, hash_hi: u64::from_be_bytes(hi), hash_lo: u64::from_be_bytes(lo) }
    }

    /// Hash the canonical JSON form of `workbook`.
    pub fn of_workbook(len: usize, workbook: &Workbook) -> Result<Self, CliError> {
        let bytes = serde_json::to_vec(workbook).map_err(|e| CliError::io(format!("cannot serialize workbook: {}", e)))?;
        let hash = blake3::hash(&bytes);
        let mut truncated = [0u8; 16];
        truncated.copy_from_slice(&hash.as_bytes()[0..16]);
        Ok(Self::new(len, truncated))
    }

    /// Parse the "v1:len:hash" form.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 || parts[0] != FINGERPRINT_VERSION {
            return None;
        }
        let len: usize = parts[1].parse().ok()?;
        let hex = parts[2];
        if hex.len() != 32 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let hash_hi = u64::from_str_radix(&hex[0..16], 16).ok()?;
        let hash_lo = u64::from_str_radix(&hex[16..32], 16).ok()?;
        Some(Self { len, hash_hi, hash_lo })
    }
}

impl std::fmt::Display for ReplayFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{:016x}{:016x}", FINGERPRINT_VERSION, self.len, self.hash_hi, self.hash_lo)
    }
}

/// Counts reported after a replay, as printed by `--json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub invoked: usize,
    pub rejected: usize,
    pub undone: usize,
    pub redone: usize,
    /// Undo/redo requests that found nothing to do.
    pub empty_history: usize,
    pub dropped: usize,
    pub sheets_added: usize,
    pub sheets_deleted: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub fingerprint: String,
}

pub struct ReplayOutcome {
    pub workbook: Workbook,
    pub report: ReplayReport,
}

/// Parse a script. Blank lines and `#` comments are skipped.
pub fn parse_script(script: &str) -> Result<Vec<(usize, Step)>, CliError> {
    let mut steps = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(trimmed).map_err(|e| {
            CliError::new(EXIT_REPLAY_PARSE, format!("line {}: {}", line_no, e))
                .with_hint("run `tabula kinds` for the supported action kinds")
        })?;
        steps.push((line_no, step));
    }
    Ok(steps)
}

/// Load a workbook saved with `-o`.
pub fn load_workbook(path: &Path) -> Result<Workbook, CliError> {
    let contents = fs::read_to_string(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::new(EXIT_REPLAY_PARSE, format!("{}: not a tabula workbook: {}", path.display(), e)))
}

pub fn save_workbook(workbook: &Workbook, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(workbook).map_err(|e| CliError::io(e.to_string()))?;
    fs::write(path, json).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

/// Read and run the script at `path`.
pub fn execute_script(path: &Path, workbook: Workbook, options: ReplayOptions) -> Result<ReplayOutcome, CliError> {
    let script = fs::read_to_string(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    let steps = parse_script(&script)?;
    run_steps(steps, workbook, options)
}

pub fn run_steps(steps: Vec<(usize, Step)>, workbook: Workbook, options: ReplayOptions) -> Result<ReplayOutcome, CliError> {
    let mut doc = Document::with_max_depth(workbook, options.max_history);
    let mut report = ReplayReport { steps: steps.len(), ..ReplayReport::default() };

    for (line, step) in steps {
        debug!(line, ?step, "replay step");
        match step {
            Step::Invoke { label, actions } => {
                let command = Command { label, actions };
                match doc.invoke(command) {
                    Ok(_) => report.invoked += 1,
                    Err(err) => handle_command_error(line, err, options, &mut report)?,
                }
            }
            Step::Undo => match doc.undo() {
                Ok(HistoryStep::Applied(_)) => report.undone += 1,
                Ok(HistoryStep::EmptyHistory) => report.empty_history += 1,
                Err(err) => handle_command_error(line, err, options, &mut report)?,
            },
            Step::Redo => match doc.redo() {
                Ok(HistoryStep::Applied(_)) => report.redone += 1,
                Ok(HistoryStep::EmptyHistory) => report.empty_history += 1,
                Err(err) => handle_command_error(line, err, options, &mut report)?,
            },
            Step::AddSheet { name } => match doc.workbook_mut().add_sheet_named(&name) {
                Some(id) => {
                    debug!(line, sheet = %id, name = %name, "sheet added");
                    report.sheets_added += 1;
                }
                None => reject(line, format!("cannot add sheet '{}': blank or already taken", name), options, &mut report)?,
            },
            Step::DeleteSheet { sheet_id } => match doc.workbook_mut().delete_sheet(sheet_id) {
                Some(_) => report.sheets_deleted += 1,
                None => reject(line, format!("cannot delete sheet {}: unknown or last sheet", sheet_id), options, &mut report)?,
            },
        }
    }

    report.can_undo = doc.can_undo();
    report.can_redo = doc.can_redo();
    let workbook = doc.into_workbook();
    report.fingerprint = ReplayFingerprint::of_workbook(report.steps, &workbook)?.to_string();
    info!(steps = report.steps, invoked = report.invoked, rejected = report.rejected, "replay finished");

    Ok(ReplayOutcome { workbook, report })
}

fn handle_command_error(line: usize, err: CommandError, options: ReplayOptions, report: &mut ReplayReport) -> Result<(), CliError> {
    match err {
        CommandError::Validation(_) => reject(line, err.to_string(), options, report),
        CommandError::TargetNotFound { .. } => {
            report.dropped += 1;
            if options.strict {
                return Err(CliError::new(EXIT_REPLAY_DROPPED, format!("line {}: {}", line, err))
                    .with_hint("a sheet was deleted after the entry was recorded"));
            }
            warn!(line, error = %err, "continuing after dropped history entry");
            Ok(())
        }
    }
}

fn reject(line: usize, message: String, options: ReplayOptions, report: &mut ReplayReport) -> Result<(), CliError> {
    report.rejected += 1;
    if options.strict {
        return Err(CliError::new(EXIT_REPLAY_REJECTED, format!("line {}: {}", line, message)));
    }
    warn!(line, "{}", message);
    Ok(())
}
