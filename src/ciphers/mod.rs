// Ciphers module - structural decomposition of negotiated cipher suites

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod analyzer;

/// Key exchange algorithm encoded in a cipher suite name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyExchange {
    Ecdhe,
    Dhe,
    Rsa,
    Unknown,
}

/// Bulk (symmetric) cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkCipher {
    #[serde(rename = "AES128")]
    Aes128,
    #[serde(rename = "AES256")]
    Aes256,
    #[serde(rename = "CHACHA20")]
    ChaCha20,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// MAC or AEAD mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MacMode {
    Aead,
    Sha256,
    Sha384,
    Sha1,
    Unknown,
}

/// Overall strength classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CipherStrength {
    Strong,
    Medium,
    Weak,
}

impl fmt::Display for CipherStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherStrength::Strong => write!(f, "STRONG"),
            CipherStrength::Medium => write!(f, "MEDIUM"),
            CipherStrength::Weak => write!(f, "WEAK"),
        }
    }
}

/// Structural attributes of one cipher suite, derived purely from its name.
///
/// A value type: stateless and reconstructable from `raw_name` at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherDescriptor {
    pub raw_name: String,
    pub key_exchange: KeyExchange,
    pub bulk_cipher: BulkCipher,
    pub mac_mode: MacMode,
    pub has_forward_secrecy: bool,
    pub strength: CipherStrength,
}

impl CipherDescriptor {
    pub fn is_aead(&self) -> bool {
        self.mac_mode == MacMode::Aead
    }

    pub fn is_strong(&self) -> bool {
        self.strength == CipherStrength::Strong
    }

    pub fn is_weak(&self) -> bool {
        self.strength == CipherStrength::Weak
    }
}
