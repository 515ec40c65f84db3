// Recommendation generator - maps detected deficiencies to remediation actions
//
// A fixed rule table, evaluated in declaration order, then stably sorted by
// descending priority. The stable sort keeps ties in rule order so two runs
// over the same results always emit the same list.

use super::SecurityLevel;
use crate::protocols::{ConnectionFailure, ProtocolProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remediation priority, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Critical => write!(f, "CRITICAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// One remediation action tied to the finding that triggered it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
    pub related_finding: String,
}

impl Recommendation {
    fn new(priority: Priority, message: &str, related_finding: String) -> Self {
        Self {
            priority,
            message: message.to_string(),
            related_finding,
        }
    }
}

/// Generate prioritized remediation guidance from the probe results.
///
/// Never returns an empty list: a fully compliant configuration gets a
/// single informational entry, and an unreachable target gets a targeted
/// ops-facing entry instead of TLS advice it cannot act on.
pub fn recommend(results: &[ProtocolProbeResult], level: SecurityLevel) -> Vec<Recommendation> {
    // An unreachable host needs network remediation, not TLS remediation
    let all_unreachable = !results.is_empty()
        && results
            .iter()
            .all(|r| r.failure_kind == Some(ConnectionFailure::Unreachable));
    if all_unreachable {
        return vec![Recommendation::new(
            Priority::High,
            "Target unreachable; cannot assess TLS configuration. Verify DNS and network connectivity.",
            "all protocol probes failed with unreachable".to_string(),
        )];
    }

    let mut recommendations = Vec::new();

    let legacy_supported: Vec<_> = results
        .iter()
        .filter(|r| r.supported && r.version.is_legacy())
        .map(|r| r.version.name())
        .collect();
    if !legacy_supported.is_empty() {
        recommendations.push(Recommendation::new(
            Priority::Critical,
            "Disable TLS 1.0/1.1; these versions are deprecated and must not be offered.",
            format!("legacy protocol support: {}", legacy_supported.join(", ")),
        ));
    }

    let has_modern = results
        .iter()
        .any(|r| r.supported && r.version.is_modern());
    if !has_modern {
        recommendations.push(Recommendation::new(
            Priority::Critical,
            "Enable TLS 1.2 and/or TLS 1.3; no modern protocol version is offered.",
            "no TLS 1.2 or TLS 1.3 support detected".to_string(),
        ));
    }

    let weak_ciphers: Vec<_> = results
        .iter()
        .filter_map(|r| r.negotiated_cipher.as_ref())
        .filter(|c| c.is_weak())
        .map(|c| c.raw_name.as_str())
        .collect();
    if !weak_ciphers.is_empty() {
        recommendations.push(Recommendation::new(
            Priority::High,
            "Remove weak cipher suites from the server configuration.",
            format!("weak cipher negotiated: {}", weak_ciphers.join(", ")),
        ));
    }

    let negotiated: Vec<_> = results
        .iter()
        .filter_map(|r| r.negotiated_cipher.as_ref())
        .collect();
    if !negotiated.is_empty() && !negotiated.iter().any(|c| c.has_forward_secrecy) {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            "Enable ECDHE/DHE-based cipher suites to provide forward secrecy.",
            "no negotiated cipher provides forward secrecy".to_string(),
        ));
    }

    if recommendations.is_empty() {
        if level == SecurityLevel::High {
            recommendations.push(Recommendation::new(
                Priority::Low,
                "Configuration is acceptable; no changes required.",
                "no deficiency detected".to_string(),
            ));
        } else {
            // Below HIGH with no rule fired: the missing points come from
            // TLS 1.3 and strong-cipher coverage
            recommendations.push(Recommendation::new(
                Priority::Medium,
                "Enable TLS 1.3 and prefer AES-256-GCM or ChaCha20-Poly1305 cipher suites.",
                "no TLS 1.3 or strong AEAD cipher negotiated".to_string(),
            ));
        }
    }

    // Stable: ties keep rule order
    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::analyzer::analyze;
    use crate::protocols::ProtocolVersion;
    use crate::rating::scoring::score;

    fn supported(version: ProtocolVersion, cipher: &str) -> ProtocolProbeResult {
        ProtocolProbeResult::negotiated(version, analyze(cipher), 10)
    }

    fn rejected(version: ProtocolVersion) -> ProtocolProbeResult {
        ProtocolProbeResult::failed(version, ConnectionFailure::Rejected)
    }

    fn recommend_for(results: &[ProtocolProbeResult]) -> Vec<Recommendation> {
        let (_, level) = score(results);
        recommend(results, level)
    }

    #[test]
    fn test_legacy_protocol_is_critical_and_first() {
        let results = vec![
            supported(ProtocolVersion::Tls10, "AES256-SHA"),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
            rejected(ProtocolVersion::Tls13),
        ];

        let recs = recommend_for(&results);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert!(recs[0].message.contains("Disable TLS 1.0/1.1"));
        assert!(recs[0].related_finding.contains("TLS 1.0"));
    }

    #[test]
    fn test_compliant_config_gets_single_informational_entry() {
        let results = vec![
            rejected(ProtocolVersion::Tls10),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
            supported(ProtocolVersion::Tls13, "TLS13_AES_256_GCM_SHA384"),
        ];

        let recs = recommend_for(&results);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
        assert!(recs[0].message.contains("acceptable"));
    }

    #[test]
    fn test_no_modern_protocol_is_critical() {
        let results = vec![
            supported(ProtocolVersion::Tls10, "AES256-SHA"),
            supported(ProtocolVersion::Tls11, "AES256-SHA"),
            rejected(ProtocolVersion::Tls12),
            rejected(ProtocolVersion::Tls13),
        ];

        let recs = recommend_for(&results);
        assert!(recs
            .iter()
            .any(|r| r.priority == Priority::Critical && r.message.contains("Enable TLS 1.2")));
        // Both critical entries present, legacy rule first (stable sort)
        assert!(recs[0].message.contains("Disable"));
        assert!(recs[1].message.contains("Enable"));
    }

    #[test]
    fn test_weak_cipher_is_high_priority() {
        let results = vec![
            rejected(ProtocolVersion::Tls10),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "RC4-MD5"),
            rejected(ProtocolVersion::Tls13),
        ];

        let recs = recommend_for(&results);
        assert!(recs
            .iter()
            .any(|r| r.priority == Priority::High && r.message.contains("weak cipher")));
    }

    #[test]
    fn test_missing_forward_secrecy_is_medium() {
        let results = vec![
            rejected(ProtocolVersion::Tls10),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "AES256-GCM-SHA384"),
            rejected(ProtocolVersion::Tls13),
        ];

        let recs = recommend_for(&results);
        assert!(recs
            .iter()
            .any(|r| r.priority == Priority::Medium && r.message.contains("forward secrecy")));
    }

    #[test]
    fn test_unreachable_target_gets_targeted_entry() {
        let results: Vec<_> = ProtocolVersion::all()
            .into_iter()
            .map(|v| ProtocolProbeResult::failed(v, ConnectionFailure::Unreachable))
            .collect();

        let recs = recommend_for(&results);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].message.contains("unreachable"));
    }

    #[test]
    fn test_recommendations_never_empty_below_high() {
        // TLS 1.2 only, medium cipher with FS: no deficiency rule fires,
        // but the level is below HIGH so the fallback entry must appear
        let results = vec![
            rejected(ProtocolVersion::Tls10),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES128-GCM-SHA256"),
            rejected(ProtocolVersion::Tls13),
        ];

        let (_, level) = score(&results);
        assert_ne!(level, SecurityLevel::High);

        let recs = recommend(&results, level);
        assert!(!recs.is_empty());
    }

    #[test]
    fn test_ordering_descending_priority() {
        let results = vec![
            supported(ProtocolVersion::Tls10, "RC4-MD5"),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "AES128-SHA"),
            rejected(ProtocolVersion::Tls13),
        ];

        let recs = recommend_for(&results);
        for pair in recs.windows(2) {
            assert!(pair[0].priority <= pair[1].priority);
        }
    }

    #[test]
    fn test_deterministic_between_runs() {
        let results = vec![
            supported(ProtocolVersion::Tls10, "RC4-MD5"),
            supported(ProtocolVersion::Tls12, "AES128-SHA"),
        ];

        let first = recommend_for(&results);
        let second = recommend_for(&results);
        let first_msgs: Vec<_> = first.iter().map(|r| &r.message).collect();
        let second_msgs: Vec<_> = second.iter().map(|r| &r.message).collect();
        assert_eq!(first_msgs, second_msgs);
    }
}
