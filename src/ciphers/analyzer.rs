// Cipher analyzer - classifies cipher suite names into structural attributes
//
// The pattern checks are explicit ordered rule tables, first match wins.
// Ordering carries meaning: ECDHE must be checked before DHE (every ECDHE
// name contains DHE as a substring), and the AES256 spellings before the
// AES128 ones. Keeping the tables as data makes the ordering dependency
// visible instead of burying it in an if-chain.

use super::{BulkCipher, CipherDescriptor, CipherStrength, KeyExchange, MacMode};

/// TLS 1.3 ciphersuite name prefixes.
///
/// TLS 1.3 names do not encode key exchange but always provide forward
/// secrecy. The bare `TLS_` prefix is not enough: IANA names for older
/// versions (e.g. TLS_RSA_WITH_AES_128_CBC_SHA) start with it too, so the
/// prefix must include the bulk algorithm.
const TLS13_PREFIXES: &[&str] = &["TLS13_", "TLS_AES_", "TLS_CHACHA20_"];

const KEY_EXCHANGE_RULES: &[(&str, KeyExchange)] = &[
    ("ECDHE", KeyExchange::Ecdhe),
    ("DHE", KeyExchange::Dhe),
    ("RSA", KeyExchange::Rsa),
];

const BULK_CIPHER_RULES: &[(&str, BulkCipher)] = &[
    ("AES_256", BulkCipher::Aes256),
    ("AES-256", BulkCipher::Aes256),
    ("AES256", BulkCipher::Aes256),
    ("AES_128", BulkCipher::Aes128),
    ("AES-128", BulkCipher::Aes128),
    ("AES128", BulkCipher::Aes128),
    ("CHACHA20", BulkCipher::ChaCha20),
];

const MAC_RULES: &[(&str, MacMode)] = &[
    ("GCM", MacMode::Aead),
    ("POLY1305", MacMode::Aead),
    ("CCM", MacMode::Aead),
    ("SHA384", MacMode::Sha384),
    ("SHA256", MacMode::Sha256),
    ("SHA", MacMode::Sha1),
];

/// Legacy algorithm markers that force a WEAK classification
const LEGACY_MARKERS: &[&str] = &["RC4", "3DES", "DES", "MD5", "NULL", "EXPORT"];

/// Decompose a cipher suite name into its structural attributes.
///
/// Total function: every input, including the empty string and names from
/// unknown vendors, yields a descriptor; unrecognized fields degrade to
/// `Unknown` rather than failing the assessment.
pub fn analyze(raw_name: &str) -> CipherDescriptor {
    let name = raw_name.trim().to_ascii_uppercase();

    let is_tls13_suite = TLS13_PREFIXES.iter().any(|p| name.starts_with(p));

    let key_exchange = if is_tls13_suite {
        // By convention: TLS 1.3 key exchange is always ephemeral ECDHE/DHE
        KeyExchange::Ecdhe
    } else {
        first_match(KEY_EXCHANGE_RULES, &name).unwrap_or(KeyExchange::Unknown)
    };

    let has_forward_secrecy = is_tls13_suite
        || matches!(key_exchange, KeyExchange::Ecdhe | KeyExchange::Dhe);

    let bulk_cipher = first_match(BULK_CIPHER_RULES, &name).unwrap_or(BulkCipher::Unknown);
    let mac_mode = first_match(MAC_RULES, &name).unwrap_or(MacMode::Unknown);

    let strength = classify_strength(&name, has_forward_secrecy, bulk_cipher, mac_mode);

    CipherDescriptor {
        raw_name: raw_name.to_string(),
        key_exchange,
        bulk_cipher,
        mac_mode,
        has_forward_secrecy,
        strength,
    }
}

fn first_match<T: Copy>(rules: &[(&str, T)], name: &str) -> Option<T> {
    rules
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, value)| *value)
}

fn classify_strength(
    name: &str,
    has_forward_secrecy: bool,
    bulk: BulkCipher,
    mac: MacMode,
) -> CipherStrength {
    // Legacy markers dominate everything else
    if bulk == BulkCipher::Unknown || LEGACY_MARKERS.iter().any(|m| name.contains(m)) {
        return CipherStrength::Weak;
    }

    if has_forward_secrecy
        && matches!(bulk, BulkCipher::Aes256 | BulkCipher::ChaCha20)
        && mac == MacMode::Aead
    {
        return CipherStrength::Strong;
    }

    CipherStrength::Medium
}
