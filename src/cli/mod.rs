// CLI module - command line interface and argument parsing

use crate::error::ProbeError;
use crate::output::OutputFormat;
use crate::Result;
use clap::Parser;
use std::path::PathBuf;

/// tlsgauge - TLS capability prober and security posture scorer
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(name = "tlsgauge")]
#[command(about = "TLS capability prober and security posture scorer", long_about = None)]
pub struct Args {
    /// Targets to assess (host, host:port, or URL)
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Input file with one target per line ('#' lines are comments)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Port used when a target does not carry one
    #[arg(long = "port", value_name = "PORT", default_value_t = 443)]
    pub port: u16,

    /// Per-probe timeout in milliseconds
    #[arg(long = "timeout", value_name = "MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Emit JSON instead of terminal text
    #[arg(long = "json")]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Maximum targets assessed concurrently in batch mode
    #[arg(long = "max-parallel", value_name = "N", default_value_t = 16)]
    pub max_parallel: usize,

    /// Disable the single retry on probe timeout
    #[arg(long = "no-retry")]
    pub no_retry: bool,

    /// Suppress progress output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    /// Selected output format
    pub fn output_format(&self) -> OutputFormat {
        if self.pretty {
            OutputFormat::JsonPretty
        } else if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Collect targets from positionals and the optional input file.
    ///
    /// Errors when no target is given anywhere.
    pub fn load_targets(&self) -> Result<Vec<String>> {
        let mut targets = self.targets.clone();

        if let Some(path) = &self.input_file {
            targets.extend(targets_from_file(path)?);
        }

        if targets.is_empty() {
            return Err(ProbeError::InvalidInput {
                message: "no targets given; pass TARGET arguments or --file".to_string(),
            }
            .into());
        }
        Ok(targets)
    }
}

/// Read targets from a file, one per line, skipping blanks and '#' comments
fn targets_from_file(path: &PathBuf) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
