// Protocols module - TLS protocol version definitions and probing

use crate::ciphers::CipherDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod driver;
pub mod prober;

/// TLS protocol versions under test.
///
/// The set is fixed: these are the four versions a posture assessment cares
/// about. `Ord` follows the wire version, oldest first, which the prober
/// relies on for deterministic result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "TLS1_0")]
    Tls10,
    #[serde(rename = "TLS1_1")]
    Tls11,
    #[serde(rename = "TLS1_2")]
    Tls12,
    #[serde(rename = "TLS1_3")]
    Tls13,
}

impl ProtocolVersion {
    /// All versions, ascending
    pub fn all() -> [ProtocolVersion; 4] {
        [
            ProtocolVersion::Tls10,
            ProtocolVersion::Tls11,
            ProtocolVersion::Tls12,
            ProtocolVersion::Tls13,
        ]
    }

    /// Get protocol name
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolVersion::Tls10 => "TLS 1.0",
            ProtocolVersion::Tls11 => "TLS 1.1",
            ProtocolVersion::Tls12 => "TLS 1.2",
            ProtocolVersion::Tls13 => "TLS 1.3",
        }
    }

    /// Version string as OpenSSL reports it after a handshake
    pub fn openssl_name(&self) -> &'static str {
        match self {
            ProtocolVersion::Tls10 => "TLSv1",
            ProtocolVersion::Tls11 => "TLSv1.1",
            ProtocolVersion::Tls12 => "TLSv1.2",
            ProtocolVersion::Tls13 => "TLSv1.3",
        }
    }

    /// TLS 1.2 and 1.3 count as modern for scoring purposes
    pub fn is_modern(&self) -> bool {
        matches!(self, ProtocolVersion::Tls12 | ProtocolVersion::Tls13)
    }

    /// TLS 1.0 and 1.1 are deprecated (RFC 8996)
    pub fn is_legacy(&self) -> bool {
        matches!(self, ProtocolVersion::Tls10 | ProtocolVersion::Tls11)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classified probe failure.
///
/// This is a valid probe outcome, not an error type: a well-configured
/// server actively rejecting TLS 1.0 is exactly what we want to observe.
/// Conflating these variants produces false negatives that silently pass a
/// probe for an insecure configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionFailure {
    /// Peer actively refused the version (alert / handshake failure)
    Rejected,
    /// DNS failure or connection refused; fatal for the whole target
    Unreachable,
    /// No response within the probe deadline; retryable
    Timeout,
    /// Peer negotiated a different version than the one requested
    ProtocolMismatch,
}

impl ConnectionFailure {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionFailure::Rejected => "rejected",
            ConnectionFailure::Unreachable => "unreachable",
            ConnectionFailure::Timeout => "timeout",
            ConnectionFailure::ProtocolMismatch => "protocol mismatch",
        }
    }
}

impl fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parameters of a completed, version-pinned handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiatedHandshake {
    pub version: ProtocolVersion,
    pub cipher_name: String,
    pub handshake_time_ms: u64,
}

/// Outcome of probing one (target, version) pair.
///
/// Built only through [`ProtocolProbeResult::negotiated`] and
/// [`ProtocolProbeResult::failed`] so that `negotiated_cipher` is present
/// exactly when `supported` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolProbeResult {
    pub version: ProtocolVersion,
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiated_cipher: Option<CipherDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<ConnectionFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handshake_time_ms: Option<u64>,
}

impl ProtocolProbeResult {
    /// A version the peer negotiated
    pub fn negotiated(
        version: ProtocolVersion,
        cipher: CipherDescriptor,
        handshake_time_ms: u64,
    ) -> Self {
        Self {
            version,
            supported: true,
            negotiated_cipher: Some(cipher),
            failure_kind: None,
            handshake_time_ms: Some(handshake_time_ms),
        }
    }

    /// A version the peer did not negotiate, with the classified reason
    pub fn failed(version: ProtocolVersion, kind: ConnectionFailure) -> Self {
        Self {
            version,
            supported: false,
            negotiated_cipher: None,
            failure_kind: Some(kind),
            handshake_time_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        let mut versions = vec![
            ProtocolVersion::Tls13,
            ProtocolVersion::Tls10,
            ProtocolVersion::Tls12,
            ProtocolVersion::Tls11,
        ];
        versions.sort();
        assert_eq!(versions, ProtocolVersion::all());
    }

    #[test]
    fn test_modern_and_legacy_partition() {
        for version in ProtocolVersion::all() {
            assert_ne!(version.is_modern(), version.is_legacy());
        }
        assert!(ProtocolVersion::Tls12.is_modern());
        assert!(ProtocolVersion::Tls13.is_modern());
        assert!(ProtocolVersion::Tls10.is_legacy());
        assert!(ProtocolVersion::Tls11.is_legacy());
    }

    #[test]
    fn test_result_constructors_uphold_invariant() {
        let supported = ProtocolProbeResult::negotiated(
            ProtocolVersion::Tls13,
            crate::ciphers::analyzer::analyze("TLS13_AES_256_GCM_SHA384"),
            12,
        );
        assert!(supported.supported);
        assert!(supported.negotiated_cipher.is_some());
        assert!(supported.failure_kind.is_none());

        let failed =
            ProtocolProbeResult::failed(ProtocolVersion::Tls10, ConnectionFailure::Rejected);
        assert!(!failed.supported);
        assert!(failed.negotiated_cipher.is_none());
        assert_eq!(failed.failure_kind, Some(ConnectionFailure::Rejected));
    }

    #[test]
    fn test_version_serde_names() {
        let json = serde_json::to_string(&ProtocolVersion::Tls12).unwrap();
        assert_eq!(json, "\"TLS1_2\"");
    }
}
