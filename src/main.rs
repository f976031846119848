//! syntaxhl - highlight files with rule-based syntax definitions
//!
//! Prints the color boundaries of every line as `column=group` pairs,
//! with `-` marking a return to plain text.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use syntaxhl::config::CONFIG_ENV;
use syntaxhl::{GroupRegistry, HighlightConfig, Highlighter, LineMatch, Result, SyntaxManager};

#[derive(Parser, Debug)]
#[command(name = "syntaxhl", version, about = "Highlight files with rule-based syntax definitions")]
struct Cli {
    /// Syntax definition file (TOML), may be given more than once
    #[arg(short, long = "syntax", required = true)]
    syntax: Vec<PathBuf>,

    /// Configuration file (defaults to ~/.syntaxhl.conf)
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Use this filetype instead of detecting one
    #[arg(short = 't', long)]
    filetype: Option<String>,

    /// Only report the filetype detected for each input
    #[arg(long)]
    detect: bool,

    /// Files to highlight
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => HighlightConfig::load_from(path)?,
        None => HighlightConfig::load(),
    };
    debug!(?config, "loaded configuration");

    let mut manager = SyntaxManager::with_registry(GroupRegistry::new(), config.budget());
    for path in &cli.syntax {
        manager.load_file(path)?;
    }
    debug!(filetypes = ?manager.list_filetypes(), "loaded syntax definitions");

    for input in &cli.inputs {
        let text = fs::read_to_string(input)?;
        let name = input.to_string_lossy();
        let lines: Vec<&str> = text.lines().collect();

        let highlighter = match &cli.filetype {
            Some(filetype) => manager.get(filetype),
            None => manager.detect(&name, &lines),
        };

        if cli.detect {
            println!("{}", detection_report(&name, highlighter));
            continue;
        }

        let Some(highlighter) = highlighter else {
            warn!(file = %name, "no syntax definition matches");
            continue;
        };

        println!("== {} ({})", name, highlighter.definition().filetype());
        for (idx, line_match) in highlighter.highlight_string(&text).iter().enumerate() {
            println!("{:>5}: {}", idx + 1, format_boundaries(line_match));
        }
    }

    Ok(())
}

/// `name: filetype`, or `name: none` when nothing was detected
fn detection_report(name: &str, highlighter: Option<&Highlighter>) -> String {
    let filetype = highlighter.map_or("none", |hl| hl.definition().filetype());
    format!("{}: {}", name, filetype)
}

fn format_boundaries(line_match: &LineMatch) -> String {
    line_match
        .iter()
        .map(|(column, group)| format!("{}={}", column, group.map_or("-", |g| g.name())))
        .collect::<Vec<_>>()
        .join(" ")
}
