// Scoring engine - weighted 0-100 security score over protocol probe results
//
// Additive with an explicit cap, not averaged: a server that supports many
// good ciphers but also tolerates a legacy protocol must not average its
// way to a passing grade. Pure arithmetic over the result list; no I/O, no
// clock, no global state, so identical inputs score identically across
// runs and across hosts.

use super::SecurityLevel;
use crate::protocols::{ProtocolProbeResult, ProtocolVersion};

/// Bonus for TLS 1.2 support
pub const TLS12_BONUS: i32 = 40;

/// Bonus for TLS 1.3 support
pub const TLS13_BONUS: i32 = 50;

/// Bonus per STRONG negotiated cipher
pub const STRONG_CIPHER_BONUS: i32 = 15;

/// Cap on the total strong-cipher contribution. Kept below the MEDIUM
/// threshold (50) so cipher quality alone can never produce a passing
/// score without modern protocol support.
pub const STRONG_CIPHER_CAP: i32 = 30;

/// Penalty applied once when TLS 1.0 or 1.1 is supported. Legacy exposure
/// is an active risk, not merely a missed bonus.
pub const LEGACY_PENALTY: i32 = 30;

/// Compute the weighted security score and its categorical level.
pub fn score(results: &[ProtocolProbeResult]) -> (u8, SecurityLevel) {
    let supports = |version: ProtocolVersion| {
        results.iter().any(|r| r.version == version && r.supported)
    };

    let mut total: i32 = 0;

    // Independent modern-protocol bonuses; both may apply
    if supports(ProtocolVersion::Tls12) {
        total += TLS12_BONUS;
    }
    if supports(ProtocolVersion::Tls13) {
        total += TLS13_BONUS;
    }

    // Strong negotiated ciphers across supported versions, capped
    let strong_count = results
        .iter()
        .filter(|r| r.supported)
        .filter_map(|r| r.negotiated_cipher.as_ref())
        .filter(|c| c.is_strong())
        .count() as i32;
    total += (strong_count * STRONG_CIPHER_BONUS).min(STRONG_CIPHER_CAP);

    // Hard penalty for legacy protocol exposure
    if supports(ProtocolVersion::Tls10) || supports(ProtocolVersion::Tls11) {
        total -= LEGACY_PENALTY;
    }

    let clamped = total.clamp(0, 100) as u8;
    (clamped, SecurityLevel::from_score(clamped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphers::analyzer::analyze;
    use crate::protocols::ConnectionFailure;

    fn supported(version: ProtocolVersion, cipher: &str) -> ProtocolProbeResult {
        ProtocolProbeResult::negotiated(version, analyze(cipher), 10)
    }

    fn rejected(version: ProtocolVersion) -> ProtocolProbeResult {
        ProtocolProbeResult::failed(version, ConnectionFailure::Rejected)
    }

    #[test]
    fn test_legacy_plus_modern_scores_low() {
        // TLS 1.0 + TLS 1.2 with a strong cipher: 40 + 15 - 30 = 25
        let results = vec![
            supported(ProtocolVersion::Tls10, "AES256-SHA"),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
            rejected(ProtocolVersion::Tls13),
        ];

        let (score_value, level) = score(&results);
        assert_eq!(score_value, 25);
        assert_eq!(level, SecurityLevel::Low);
    }

    #[test]
    fn test_fully_modern_scores_high() {
        // 40 + 50 + 2 strong ciphers (capped at 30) = 120, clamped to 100
        let results = vec![
            rejected(ProtocolVersion::Tls10),
            rejected(ProtocolVersion::Tls11),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
            supported(ProtocolVersion::Tls13, "TLS13_AES_256_GCM_SHA384"),
        ];

        let (score_value, level) = score(&results);
        assert_eq!(score_value, 100);
        assert_eq!(level, SecurityLevel::High);
    }

    #[test]
    fn test_nothing_supported_scores_zero() {
        let results: Vec<_> = ProtocolVersion::all()
            .into_iter()
            .map(|v| ProtocolProbeResult::failed(v, ConnectionFailure::Unreachable))
            .collect();

        let (score_value, level) = score(&results);
        assert_eq!(score_value, 0);
        assert_eq!(level, SecurityLevel::Low);
    }

    #[test]
    fn test_deterministic() {
        let results = vec![
            supported(ProtocolVersion::Tls10, "AES256-SHA"),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
        ];

        let first = score(&results);
        for _ in 0..100 {
            assert_eq!(score(&results), first);
        }
    }

    #[test]
    fn test_adding_tls13_never_decreases() {
        let base_sets: Vec<Vec<ProtocolProbeResult>> = vec![
            vec![rejected(ProtocolVersion::Tls13)],
            vec![
                supported(ProtocolVersion::Tls10, "AES256-SHA"),
                rejected(ProtocolVersion::Tls13),
            ],
            vec![
                supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
                rejected(ProtocolVersion::Tls13),
            ],
        ];

        for base in base_sets {
            let (before, _) = score(&base);
            let mut with_tls13: Vec<_> = base
                .into_iter()
                .filter(|r| r.version != ProtocolVersion::Tls13)
                .collect();
            with_tls13.push(supported(
                ProtocolVersion::Tls13,
                "TLS13_AES_256_GCM_SHA384",
            ));
            let (after, _) = score(&with_tls13);
            assert!(after >= before, "adding TLS 1.3 lowered {} to {}", before, after);
        }
    }

    #[test]
    fn test_adding_tls10_never_increases() {
        let base_sets: Vec<Vec<ProtocolProbeResult>> = vec![
            vec![supported(
                ProtocolVersion::Tls12,
                "ECDHE-RSA-AES256-GCM-SHA384",
            )],
            vec![
                supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
                supported(ProtocolVersion::Tls13, "TLS13_AES_256_GCM_SHA384"),
            ],
        ];

        for base in base_sets {
            let (before, _) = score(&base);
            let mut with_legacy = base;
            // A weak legacy cipher adds no strong-cipher bonus
            with_legacy.push(supported(ProtocolVersion::Tls10, "RC4-MD5"));
            let (after, _) = score(&with_legacy);
            assert!(after <= before, "adding TLS 1.0 raised {} to {}", before, after);
        }
    }

    #[test]
    fn test_strong_cipher_contribution_capped() {
        // Four strong ciphers would be 60 uncapped; the cap keeps the
        // cipher contribution below a passing score on its own
        let results = vec![
            supported(ProtocolVersion::Tls10, "ECDHE-RSA-AES256-GCM-SHA384"),
            supported(ProtocolVersion::Tls11, "ECDHE-RSA-AES256-GCM-SHA384"),
            supported(ProtocolVersion::Tls12, "ECDHE-RSA-AES256-GCM-SHA384"),
            supported(ProtocolVersion::Tls13, "TLS13_AES_256_GCM_SHA384"),
        ];

        // 40 + 50 + 30 (capped) - 30 (legacy) = 90
        let (score_value, _) = score(&results);
        assert_eq!(score_value, 90);
    }

    #[test]
    fn test_score_never_leaves_range() {
        let everything_bad = vec![supported(ProtocolVersion::Tls10, "RC4-MD5")];
        let (score_value, level) = score(&everything_bad);
        assert_eq!(score_value, 0);
        assert_eq!(level, SecurityLevel::Low);
    }
}
