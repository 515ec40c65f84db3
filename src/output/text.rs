// Terminal output module

use crate::protocols::{ConnectionFailure, ProtocolProbeResult};
use crate::rating::{Priority, SecurityLevel};
use crate::report::SecurityAssessment;
use colored::*;
use std::fmt::Write;

/// Render a full assessment as colored terminal text
pub fn render(assessment: &SecurityAssessment) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "═".repeat(60));
    let _ = writeln!(out, "Target: {}", assessment.target.cyan().bold());
    let _ = writeln!(
        out,
        "Assessed: {}",
        assessment.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{}", "═".repeat(60));

    let _ = writeln!(out, "\n{}", "Protocol Support:".bold());
    for result in &assessment.protocol_results {
        let _ = writeln!(out, "  {}", protocol_line(result));
    }

    let _ = writeln!(
        out,
        "\n{} {} ({})",
        "Security Score:".bold(),
        colorize_score(assessment.security_score, assessment.security_level),
        colorize_level(assessment.security_level)
    );

    let _ = writeln!(out, "\n{}", "Recommendations:".bold());
    for rec in &assessment.recommendations {
        let _ = writeln!(
            out,
            "  [{}] {}",
            colorize_priority(rec.priority),
            rec.message
        );
        let _ = writeln!(out, "         finding: {}", rec.related_finding.dimmed());
    }

    out
}

/// One-line summary for batch mode
pub fn render_summary_line(assessment: &SecurityAssessment) -> String {
    format!(
        "{:<40} {:>3}  {}",
        assessment.target,
        assessment.security_score,
        colorize_level(assessment.security_level)
    )
}

fn protocol_line(result: &ProtocolProbeResult) -> String {
    match (&result.negotiated_cipher, result.failure_kind) {
        (Some(cipher), _) => {
            let timing = result
                .handshake_time_ms
                .map(|ms| format!(" ({ms}ms)"))
                .unwrap_or_default();
            format!(
                "{:<10} {} {} [{}]{}",
                result.version.name(),
                "supported".green(),
                cipher.raw_name,
                cipher.strength,
                timing
            )
        }
        (None, Some(failure)) => {
            let label = match failure {
                // Rejection is the desired outcome for legacy versions
                ConnectionFailure::Rejected => "not offered".normal(),
                ConnectionFailure::Unreachable => "unreachable".red(),
                ConnectionFailure::Timeout => "timed out".yellow(),
                ConnectionFailure::ProtocolMismatch => "version mismatch".yellow(),
            };
            format!("{:<10} {}", result.version.name(), label)
        }
        (None, None) => format!("{:<10} {}", result.version.name(), "no result".dimmed()),
    }
}

fn colorize_score(score: u8, level: SecurityLevel) -> ColoredString {
    let text = format!("{score}/100");
    match level {
        SecurityLevel::High => text.green().bold(),
        SecurityLevel::Medium => text.yellow().bold(),
        SecurityLevel::Low => text.red().bold(),
    }
}

fn colorize_level(level: SecurityLevel) -> ColoredString {
    match level {
        SecurityLevel::High => level.to_string().green().bold(),
        SecurityLevel::Medium => level.to_string().yellow().bold(),
        SecurityLevel::Low => level.to_string().red().bold(),
    }
}

fn colorize_priority(priority: Priority) -> ColoredString {
    match priority {
        Priority::Critical => priority.to_string().red().bold(),
        Priority::High => priority.to_string().red(),
        Priority::Medium => priority.to_string().yellow(),
        Priority::Low => priority.to_string().green(),
    }
}
