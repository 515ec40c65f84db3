// Error types for tlsgauge
//
// Structured errors using thiserror for the failures that abort an
// operation outright. Per-probe outcomes (rejected, timeout, unreachable,
// protocol mismatch) are NOT errors; they are modeled as data in
// `protocols::ConnectionFailure` so that a probe failing never tears down
// the rest of an assessment.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Main error type for tlsgauge operations
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Target string could not be parsed into host and port
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// DNS resolution failed for the hostname
    #[error("DNS resolution failed for {hostname}: {source}")]
    DnsResolutionFailed {
        hostname: String,
        #[source]
        source: hickory_resolver::error::ResolveError,
    },

    /// DNS resolution succeeded but returned no addresses
    #[error("No IP addresses found for {hostname}")]
    EmptyResolution { hostname: String },

    /// Connection timeout occurred
    #[error("Connection timeout after {duration:?} to {addr}")]
    ConnectionTimeout {
        duration: Duration,
        addr: SocketAddr,
    },

    /// Generic I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input from user or configuration
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}
