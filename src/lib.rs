// tlsgauge - TLS capability prober and security posture scorer
// Copyright (C) 2026 tlsgauge contributors
// Licensed under GPL-3.0

//! tlsgauge probes a network endpoint for TLS protocol version support,
//! classifies the negotiated cipher suite, and produces a reproducible
//! weighted security score with prioritized remediation guidance. It is
//! intended for embedding in CI pipelines and operational tooling.

pub mod ciphers;
pub mod cli;
pub mod error;
pub mod output;
pub mod protocols;
pub mod rating;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::report::{Assessor, SecurityAssessment};

/// Result type for tlsgauge operations
pub type Result<T> = anyhow::Result<T>;

/// Error type for tlsgauge operations
pub use anyhow::Error;
