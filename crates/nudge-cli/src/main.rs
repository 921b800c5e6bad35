//! nudge CLI - increment or decrement the token under the cursor
//!
//! Examples:
//! - `nudge notes.txt --cursor 3:10`: bump the number, date, version... at line 3, column 10
//! - `nudge list.txt --select 1:1-20:1 --sequential`: number a column of zeros 1, 2, 3...
//! - `nudge style.css --cursor 4:12 -d --step 16 --write`: darken a color channel in place
//!
//! Rules come from `.nudge.toml` (see `--list-rules`), and `--rule` replaces
//! them for one call.

mod config;
mod logging;
mod output;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use nudge_core::{Direction, ExecuteOptions};
use nudge_rules::RuleRegistry;

use config::Config;
use output::OutputFormat;
use process::{
    build_engine, parse_position, parse_selection, process_source, read_source, scope_for,
    write_file, Request,
};

#[derive(Parser)]
#[command(name = "nudge")]
#[command(version)]
#[command(about = "Increment or decrement the token under the cursor")]
struct Cli {
    /// File to edit, or '-' to read stdin
    #[arg(required_unless_present = "list_rules")]
    path: Option<PathBuf>,

    /// Cursor position as LINE:COL, 1-based (COL counts bytes)
    #[arg(long, short = 'c', value_name = "LINE:COL", default_value = "1:1")]
    cursor: String,

    /// Decrement instead of increment
    #[arg(long, short = 'd')]
    decrement: bool,

    /// Amount to add or subtract
    #[arg(long, short = 's', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    step: u32,

    /// Change every match in LINE:COL-LINE:COL instead of the one at the cursor
    #[arg(long, value_name = "RANGE")]
    select: Option<String>,

    /// Treat the selection as a rectangle
    #[arg(long, requires = "select")]
    block: bool,

    /// Give the Nth match in the selection N times the step
    #[arg(long, requires = "select")]
    sequential: bool,

    /// Start a cumulative sequence (see --repeat)
    #[arg(long, conflicts_with = "select")]
    cumulative: bool,

    /// Repeat a cumulative operation N more times, growing the step each time
    #[arg(long, value_name = "N", default_value_t = 0, requires = "cumulative")]
    repeat: u32,

    /// Rules to use for this call (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Write the result back to the file
    #[arg(long, short = 'w')]
    write: bool,

    /// Path to config file (default: auto-detect .nudge.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let registry = Arc::new(RuleRegistry::new());

    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for info in registry.list() {
            let cyclic = if info.cyclic { " (cyclic)" } else { "" };
            println!(
                "  {} [{}] - {}{}",
                info.name.green(),
                info.priority,
                info.description,
                cyclic
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        tracing::debug!(path = %config_path.display(), "using config");
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                tracing::debug!(path = %path.display(), "using config");
                cfg
            }
            None => Config::default(),
        }
    };

    // Determine output format
    let format_name = if cli.json {
        Some("json")
    } else {
        cli.format.as_deref().or(config.output.format.as_deref())
    };
    let output_format = match format_name {
        Some(name) => OutputFormat::from_str(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                name
            )
        })?,
        None => OutputFormat::default(),
    };

    // Validate rule names from CLI
    let all_rules = registry.all_names();
    for rule in &cli.rule {
        if !all_rules.contains(&rule.as_str()) {
            eprintln!(
                "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }

    let Some(path) = cli.path.as_ref() else {
        anyhow::bail!("No file given");
    };
    let is_stdin = path.as_os_str() == "-";
    if cli.write && is_stdin {
        anyhow::bail!("--write cannot be used with stdin");
    }

    let mut options = match &cli.select {
        Some(_) => ExecuteOptions::range().sequential(cli.sequential),
        None => ExecuteOptions::single().cumulative(cli.cumulative),
    }
    .step(cli.step);
    if !cli.rule.is_empty() {
        options = options.rules(RuleRegistry::entries(&cli.rule));
    }

    let request = Request {
        cursor: parse_position(&cli.cursor)?,
        selection: cli
            .select
            .as_deref()
            .map(|range| parse_selection(range, cli.block))
            .transpose()?,
        direction: if cli.decrement {
            Direction::Decrement
        } else {
            Direction::Increment
        },
        options,
        repeat: cli.repeat,
    };

    let mut engine = build_engine(&config, Arc::clone(&registry))?;
    let scope = if is_stdin { String::new() } else { scope_for(path) };
    let source = read_source(path)?;
    let result = process_source(&mut engine, &scope, &source, &request)?;

    if cli.write && result.changed() {
        write_file(path, &result.new_source)?;
    }
    output::report(output_format, path, &result, cli.write, cli.verbose)?;

    Ok(if result.changed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
