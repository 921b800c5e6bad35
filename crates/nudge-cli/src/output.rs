//! Output formatting for nudge
//!
//! Supports text (the resulting file on stdout), JSON and unified diff.

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::Path;

use nudge_core::Outcome;

use crate::process::ProcessResult;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// JSON report of one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub version: String,
    pub path: String,
    pub outcome: &'static str,
    pub edits: usize,
    pub cursor: Position,
    pub changed: bool,
    pub written: bool,
    /// The new text, when it was not written back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Report {
    /// `write_mode`: the result goes back to the file instead of stdout
    pub fn new(path: &Path, result: &ProcessResult, write_mode: bool) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.display().to_string(),
            outcome: outcome_name(result.outcome()),
            edits: result.edits(),
            cursor: Position {
                line: result.cursor.row + 1,
                column: result.cursor.col + 1,
            },
            changed: result.changed(),
            written: write_mode && result.changed(),
            text: (!write_mode).then(|| result.new_source.clone()),
        }
    }
}

pub fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Applied { .. } => "applied",
        Outcome::NoMatch => "no_match",
        Outcome::BoundaryReached => "boundary_reached",
    }
}

/// Print the result of a run in `format`
pub fn report(
    format: OutputFormat,
    path: &Path,
    result: &ProcessResult,
    write_mode: bool,
    verbose: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if write_mode {
                if result.changed() {
                    eprintln!(
                        "{}: {} Applied {} change(s)",
                        path.display().to_string().bold(),
                        "OK".green(),
                        result.edits()
                    );
                }
            } else {
                print!("{}", result.new_source);
            }
            if !result.changed() {
                eprintln!(
                    "{}: {}",
                    "Nothing to change".yellow(),
                    outcome_name(result.outcome()).replace('_', " ")
                );
            } else if verbose {
                eprintln!(
                    "{}: {}:{}",
                    "Cursor".bold(),
                    result.cursor.row + 1,
                    result.cursor.col + 1
                );
            }
        }
        OutputFormat::Json => {
            let output = Report::new(path, result, write_mode);
            let json = serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Diff => {
            if result.changed() {
                print_unified_diff(path, &result.old_source, &result.new_source);
            }
        }
    }
    Ok(())
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    print!("{}", unified_diff(path, old, new));
}

fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    let mut out = format!("--- a/{}\n+++ b/{}\n", path_str, path_str);
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        out.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            out.push_str(&format!("{}{}", sign, change));
            if change.missing_newline() {
                out.push('\n');
            }
        }
    }
    out
}
