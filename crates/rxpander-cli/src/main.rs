//! rxpander CLI - expands templated reaction-model sources.
//!
//! Reads a template from a file or standard input, expands it, and writes
//! the result to a file or standard output. Delimiters and processing
//! policies come from an optional YAML configuration file.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use rxpander_core::{Config, TemplateProcessor};

/// rxpander - template expander for reaction models
#[derive(Parser)]
#[command(name = "rxpander")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the template file (default: stdin)
    input: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a YAML configuration file (delimiters, policies)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Assignment count above which a warning is emitted
    #[arg(long)]
    max_assignments: Option<usize>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(threshold) = cli.max_assignments {
        config.warning_assignments = threshold;
    }
    Ok(config)
}

fn read_template(cli: &Cli) -> Result<String> {
    match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read template from stdin")?;
            Ok(buffer)
        }
    }
}

fn write_expansion(cli: &Cli, text: &str) -> Result<()> {
    match &cli.output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write output {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let template = read_template(cli)?;

    let mut processor = TemplateProcessor::new(config);
    let result = match processor.process(&template) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    for warning in &result.warnings {
        eprintln!(
            "{} line {}: {}",
            "warning:".yellow().bold(),
            warning.line,
            warning.message
        );
    }

    write_expansion(cli, &result.text)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
