// Report module - assembles per-target assessments and batch runs

use crate::protocols::prober::CapabilityProber;
use crate::protocols::ProtocolProbeResult;
use crate::rating::{recommend, score, Priority, Recommendation, SecurityLevel};
use crate::utils::network::{Target, DEFAULT_PORT};
use crate::utils::retry::RetryConfig;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Worker limit for concurrent targets in a batch
const MAX_PARALLEL_TARGETS: usize = 16;

/// Complete security assessment for one target.
///
/// Immutable once returned. Field names are part of the machine-readable
/// contract consumed by external renderers; do not rename them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAssessment {
    pub target: String,
    pub timestamp: DateTime<Utc>,
    pub protocol_results: Vec<ProtocolProbeResult>,
    pub security_score: u8,
    pub security_level: SecurityLevel,
    pub recommendations: Vec<Recommendation>,
}

impl SecurityAssessment {
    /// Whether any recommendation is CRITICAL
    pub fn has_critical_finding(&self) -> bool {
        self.recommendations
            .iter()
            .any(|r| r.priority == Priority::Critical)
    }

    /// CI gating convention: pass only on HIGH level with no critical finding
    pub fn passes_gate(&self) -> bool {
        self.security_level == SecurityLevel::High && !self.has_critical_finding()
    }

    /// Whether every probe failed because the host was unreachable
    pub fn target_unreachable(&self) -> bool {
        self.protocol_results.iter().all(|r| {
            r.failure_kind == Some(crate::protocols::ConnectionFailure::Unreachable)
        })
    }
}

/// Orchestrates probing, analysis, scoring and recommendation for targets.
pub struct Assessor {
    default_port: u16,
    timeout: Duration,
    retry: RetryConfig,
    max_parallel_targets: usize,
}

impl Default for Assessor {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
            timeout: crate::utils::network::DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            max_parallel_targets: MAX_PARALLEL_TARGETS,
        }
    }
}

impl Assessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Port used when the target string does not carry one
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Per-probe timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry policy for transient probe timeouts
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Worker limit for `assess_many`
    pub fn with_max_parallel_targets(mut self, limit: usize) -> Self {
        self.max_parallel_targets = limit.max(1);
        self
    }

    /// Assess a single target.
    ///
    /// A malformed target string is an error; an unreachable or unresolvable
    /// host is not. The latter yields a complete assessment (score 0, level
    /// LOW, unreachable recommendation) so callers always get a scoreable
    /// result for a well-formed target.
    pub async fn assess(&self, target_str: &str) -> Result<SecurityAssessment> {
        let mut target =
            Target::parse(target_str, self.default_port)?.with_timeout(self.timeout);

        info!("assessing {}", target.endpoint());

        let results = match target.resolve().await {
            Ok(()) => {
                let prober =
                    CapabilityProber::new(target.clone()).with_retry_config(self.retry.clone());
                prober.probe_all().await
            }
            Err(e) => {
                warn!("{}: {}", target.endpoint(), e);
                CapabilityProber::all_unreachable()
            }
        };

        Ok(Self::assemble(target.endpoint(), results))
    }

    /// Assess a batch of targets, independently and in parallel.
    ///
    /// One target's failure or unreachable short-circuit never aborts the
    /// others; each entry carries its own result.
    pub async fn assess_many(
        &self,
        targets: &[String],
    ) -> Vec<(String, Result<SecurityAssessment>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_targets));
        let mut tasks = JoinSet::new();

        for (idx, target_str) in targets.iter().enumerate() {
            let assessor = Assessor {
                default_port: self.default_port,
                timeout: self.timeout,
                retry: self.retry.clone(),
                max_parallel_targets: self.max_parallel_targets,
            };
            let target_str = target_str.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("target semaphore closed");
                let result = assessor.assess(&target_str).await;
                (idx, target_str, result)
            });
        }

        let mut indexed = Vec::with_capacity(targets.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => indexed.push(entry),
                Err(e) => warn!("assessment task failed: {}", e),
            }
        }

        // Input order, not completion order
        indexed.sort_by_key(|(idx, _, _)| *idx);
        indexed
            .into_iter()
            .map(|(_, target, result)| (target, result))
            .collect()
    }

    /// Build the aggregate from probe results: analyze happened during
    /// probing, so this is score, recommend, stamp.
    fn assemble(endpoint: String, results: Vec<ProtocolProbeResult>) -> SecurityAssessment {
        let (security_score, security_level) = score(&results);
        let recommendations = recommend(&results, security_level);

        SecurityAssessment {
            target: endpoint,
            timestamp: Utc::now(),
            protocol_results: results,
            security_score,
            security_level,
            recommendations,
        }
    }
}
