// tlsgauge - TLS capability prober and security posture scorer
// Copyright (C) 2026 tlsgauge contributors
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use tlsgauge::output::{json, text, OutputFormat};
use tlsgauge::utils::retry::RetryConfig;
use tlsgauge::{Args, Assessor, SecurityAssessment};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("failed to install rustls crypto provider");
        return ExitCode::from(2);
    }

    // Initialize logging - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to set tracing subscriber");
        return ExitCode::from(2);
    }

    let args = Args::parse();
    match run(args).await {
        Ok(all_pass) => {
            if all_pass {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Run the assessment; Ok(true) means every target passed the gate
async fn run(args: Args) -> Result<bool> {
    let targets = args.load_targets()?;

    let retry = if args.no_retry {
        RetryConfig::no_retry()
    } else {
        RetryConfig::default()
    };
    let assessor = Assessor::new()
        .with_default_port(args.port)
        .with_timeout(Duration::from_millis(args.timeout_ms))
        .with_retry_config(retry)
        .with_max_parallel_targets(args.max_parallel);

    let format = args.output_format();

    if targets.len() == 1 {
        let assessment = assessor.assess(&targets[0]).await?;
        emit(&[assessment.clone()], format, args.output_file.as_deref())?;
        return Ok(assessment.passes_gate());
    }

    let spinner = batch_spinner(args.quiet || format != OutputFormat::Text, targets.len());

    let outcomes = assessor.assess_many(&targets).await;

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let mut assessments = Vec::new();
    let mut all_pass = true;
    let mut had_error = false;

    for (target, outcome) in outcomes {
        match outcome {
            Ok(assessment) => {
                all_pass &= assessment.passes_gate();
                assessments.push(assessment);
            }
            Err(e) => {
                had_error = true;
                eprintln!("{target}: {e:#}");
            }
        }
    }

    emit(&assessments, format, args.output_file.as_deref())?;

    if had_error && assessments.is_empty() {
        anyhow::bail!("no target could be assessed");
    }
    Ok(all_pass && !had_error)
}

fn emit(
    assessments: &[SecurityAssessment],
    format: OutputFormat,
    output_file: Option<&str>,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for assessment in assessments {
                out.push_str(&text::render(assessment));
            }
            if assessments.len() > 1 {
                out.push_str("\nSummary:\n");
                for assessment in assessments {
                    out.push_str("  ");
                    out.push_str(&text::render_summary_line(assessment));
                    out.push('\n');
                }
            }
            out
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let pretty = format == OutputFormat::JsonPretty;
            if assessments.len() == 1 {
                json::generate_json(&assessments[0], pretty)?
            } else {
                json::generate_json_batch(assessments, pretty)?
            }
        }
    };

    match output_file {
        Some(path) => std::fs::write(path, &rendered)?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn batch_spinner(suppress: bool, total: usize) -> Option<ProgressBar> {
    if suppress {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or(ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("assessing {total} targets"));
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}
