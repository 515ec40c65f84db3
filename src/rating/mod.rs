// Rating module - security posture scoring and remediation guidance

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod recommend;
pub mod scoring;

pub use recommend::{recommend, Priority, Recommendation};
pub use scoring::score;

/// Categorical security level derived from the numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityLevel {
    High,
    Medium,
    Low,
}

impl SecurityLevel {
    /// Convert score to level
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=100 => SecurityLevel::High,
            50..=79 => SecurityLevel::Medium,
            _ => SecurityLevel::Low,
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> &'static str {
        match self {
            SecurityLevel::High => "green",
            SecurityLevel::Medium => "yellow",
            SecurityLevel::Low => "red",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::High => write!(f, "HIGH"),
            SecurityLevel::Medium => write!(f, "MEDIUM"),
            SecurityLevel::Low => write!(f, "LOW"),
        }
    }
}
