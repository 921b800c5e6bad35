//! Running one engine operation over a file's text

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use nudge_core::{
    Cursor, Direction, Engine, ExecuteOptions, Outcome, Resolver, Selection, TextBuffer,
};
use nudge_rules::RuleRegistry;

use crate::config::Config;

/// What to do, with positions already converted to 0-based columns
pub struct Request {
    pub cursor: Cursor,
    pub selection: Option<Selection>,
    pub direction: Direction,
    pub options: ExecuteOptions,
    /// Extra repeat triggers after a cumulative operation
    pub repeat: u32,
}

/// Result of processing a source text
pub struct ProcessResult {
    pub old_source: String,
    pub new_source: String,
    /// The operation's outcome followed by one per repeat
    pub outcomes: Vec<Outcome>,
    pub cursor: Cursor,
}

impl ProcessResult {
    pub fn changed(&self) -> bool {
        self.old_source != self.new_source
    }

    pub fn edits(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                Outcome::Applied { edits, .. } => *edits,
                _ => 0,
            })
            .sum()
    }

    /// The outcome that describes the run as a whole: applied if anything was
    pub fn outcome(&self) -> &Outcome {
        self.outcomes
            .iter()
            .find(|o| o.is_applied())
            .or_else(|| self.outcomes.first())
            .unwrap_or(&Outcome::NoMatch)
    }
}

/// Build an engine whose global list comes from the config and whose scopes
/// are keyed by file extension
pub fn build_engine(config: &Config, registry: Arc<RuleRegistry>) -> Result<Engine> {
    let global = config.global_rules(&registry.all_names())?;
    let mut resolver = Resolver::new(RuleRegistry::entries(&global));
    for (scope, scope_config) in &config.scope {
        resolver.set_scope(scope.clone(), RuleRegistry::entries(&scope_config.rules));
    }
    Ok(Engine::new(resolver.with_loader(registry)))
}

/// Scope name for a path: its extension, or empty
pub fn scope_for(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Run `request` against `source`, keeping its line ending style and
/// trailing newline
pub fn process_source(
    engine: &mut Engine,
    scope: &str,
    source: &str,
    request: &Request,
) -> Result<ProcessResult> {
    let line_ending = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing_newline = source.ends_with('\n');

    let mut buffer = TextBuffer::from_text(source).with_cursor(request.cursor.row, request.cursor.col);
    buffer.select(request.selection);

    let mut outcomes = vec![engine.execute(&mut buffer, scope, request.direction, &request.options)?];
    for _ in 0..request.repeat {
        outcomes.push(engine.repeat(&mut buffer, Some(request.options.step))?);
    }

    let cursor = outcomes
        .iter()
        .rev()
        .find_map(|o| match o {
            Outcome::Applied { cursor, .. } => Some(*cursor),
            _ => None,
        })
        .unwrap_or(request.cursor);

    let mut new_source = buffer.lines().join(line_ending);
    if trailing_newline {
        new_source.push_str(line_ending);
    }

    Ok(ProcessResult {
        old_source: source.to_string(),
        new_source,
        outcomes,
        cursor,
    })
}

/// Read a file, or stdin for `-`
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Parse `LINE:COL` (1-based) into a 0-based cursor
pub fn parse_position(text: &str) -> Result<Cursor> {
    let Some((line, col)) = text.trim().split_once(':') else {
        bail!("Invalid position '{}', expected LINE:COL", text);
    };
    let line: usize = line
        .parse()
        .with_context(|| format!("Invalid line in '{}'", text))?;
    let col: usize = col
        .parse()
        .with_context(|| format!("Invalid column in '{}'", text))?;
    if line == 0 || col == 0 {
        bail!("Positions are 1-based, got '{}'", text);
    }
    Ok(Cursor::new(line - 1, col - 1))
}

/// Parse `LINE:COL-LINE:COL` into a selection
pub fn parse_selection(text: &str, block: bool) -> Result<Selection> {
    let Some((start, end)) = text.split_once('-') else {
        bail!("Invalid selection '{}', expected LINE:COL-LINE:COL", text);
    };
    let (start, end) = (parse_position(start)?, parse_position(end)?);
    Ok(if block {
        Selection::block(start, end)
    } else {
        Selection::linear(start, end)
    })
}
