// Capability prober - drives one version probe per protocol, concurrently
//
// All four version probes may be in flight at once, bounded by a small
// semaphore so a single assessment never looks like a port scan. The first
// Unreachable outcome poisons the target: in-flight probes are aborted,
// queued probes return without connecting, and un-probed versions are
// recorded as Unreachable.

use super::driver::VersionProbe;
use super::{ConnectionFailure, ProtocolProbeResult, ProtocolVersion};
use crate::ciphers::analyzer;
use crate::utils::network::Target;
use crate::utils::retry::RetryConfig;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Worker limit for per-target version probes
const MAX_PARALLEL_PROBES: usize = 4;

/// Probes every protocol version in the fixed enumeration against one target.
pub struct CapabilityProber {
    target: Target,
    retry: RetryConfig,
    max_parallel: usize,
}

impl CapabilityProber {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            retry: RetryConfig::default(),
            max_parallel: MAX_PARALLEL_PROBES,
        }
    }

    /// Set retry configuration for transient probe timeouts
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Probe all versions. Returns exactly one result per version, in
    /// ascending version order regardless of completion order.
    pub async fn probe_all(&self) -> Vec<ProtocolProbeResult> {
        if self.target.ip_addresses.is_empty() {
            warn!("{} has no resolved addresses", self.target.endpoint());
            return Self::all_unreachable();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let target_down = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        for version in ProtocolVersion::all() {
            let probe = VersionProbe::new(self.target.clone());
            let semaphore = Arc::clone(&semaphore);
            let target_down = Arc::clone(&target_down);
            let retry = self.retry.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("probe semaphore closed");

                // Another probe already found the host down; do not start
                if target_down.load(Ordering::SeqCst) {
                    return (version, Err(ConnectionFailure::Unreachable));
                }

                let mut outcome = probe.probe_version(version).await;

                // Bounded retry of transient timeouts; rejections are
                // definitive and never retried
                let mut attempt = 0;
                while attempt < retry.max_retries
                    && matches!(outcome, Err(ConnectionFailure::Timeout))
                    && !target_down.load(Ordering::SeqCst)
                {
                    attempt += 1;
                    debug!("{} probe timed out, retry {}", version, attempt);
                    tokio::time::sleep(retry.backoff_for(attempt)).await;
                    outcome = probe.probe_version(version).await;
                }

                if matches!(outcome, Err(ConnectionFailure::Unreachable)) {
                    target_down.store(true, Ordering::SeqCst);
                }

                (version, outcome)
            });
        }

        let mut collected: BTreeMap<ProtocolVersion, ProtocolProbeResult> = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            // Aborted probes are filled in as Unreachable below
            let Ok((version, outcome)) = joined else {
                continue;
            };

            let result = match outcome {
                Ok(handshake) => {
                    info!(
                        "{} supports {} ({})",
                        self.target.endpoint(),
                        version,
                        handshake.cipher_name
                    );
                    let descriptor = analyzer::analyze(&handshake.cipher_name);
                    ProtocolProbeResult::negotiated(
                        version,
                        descriptor,
                        handshake.handshake_time_ms,
                    )
                }
                Err(kind) => {
                    match kind {
                        ConnectionFailure::Rejected => {
                            debug!("{} rejects {}", self.target.endpoint(), version)
                        }
                        ConnectionFailure::Timeout => {
                            info!("{} probe for {} timed out", self.target.endpoint(), version)
                        }
                        ConnectionFailure::Unreachable => {
                            warn!("{} unreachable", self.target.endpoint());
                            // Cancel remaining in-flight probes for this target
                            tasks.abort_all();
                        }
                        ConnectionFailure::ProtocolMismatch => warn!(
                            "{} negotiated a different version than requested {}",
                            self.target.endpoint(),
                            version
                        ),
                    }
                    ProtocolProbeResult::failed(version, kind)
                }
            };

            collected.insert(version, result);
        }

        // Versions whose probes were cancelled by the short-circuit
        for version in ProtocolVersion::all() {
            collected.entry(version).or_insert_with(|| {
                ProtocolProbeResult::failed(version, ConnectionFailure::Unreachable)
            });
        }

        collected.into_values().collect()
    }

    /// Result set for a target that could not be resolved or reached at all
    pub fn all_unreachable() -> Vec<ProtocolProbeResult> {
        ProtocolVersion::all()
            .into_iter()
            .map(|version| ProtocolProbeResult::failed(version, ConnectionFailure::Unreachable))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_unreachable_shape() {
        let results = CapabilityProber::all_unreachable();

        assert_eq!(results.len(), 4);
        let versions: Vec<_> = results.iter().map(|r| r.version).collect();
        assert_eq!(versions, ProtocolVersion::all());
        for result in &results {
            assert!(!result.supported);
            assert_eq!(result.failure_kind, Some(ConnectionFailure::Unreachable));
        }
    }

    #[tokio::test]
    async fn test_unresolved_target_short_circuits() {
        // No DNS resolution performed, so no probe should be attempted
        let prober = CapabilityProber::new(Target::new("unresolved.example", 443));
        let results = prober.probe_all().await;

        assert_eq!(results.len(), 4);
        for result in &results {
            assert_eq!(result.failure_kind, Some(ConnectionFailure::Unreachable));
        }
    }

    #[tokio::test]
    async fn test_refused_port_marks_target_unreachable() {
        // Port 1 on localhost is almost certainly closed; connection refused
        // is target-fatal, so every version must come back Unreachable
        let mut target = Target::new("127.0.0.1", 1);
        target.ip_addresses = vec!["127.0.0.1".parse().unwrap()];
        target.timeout = std::time::Duration::from_secs(2);

        let prober = CapabilityProber::new(target).with_retry_config(RetryConfig::no_retry());
        let results = prober.probe_all().await;

        assert_eq!(results.len(), 4);
        let versions: Vec<_> = results.iter().map(|r| r.version).collect();
        assert_eq!(versions, ProtocolVersion::all());
        for result in &results {
            assert!(!result.supported);
            assert_eq!(result.failure_kind, Some(ConnectionFailure::Unreachable));
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_probe_all_modern_server() {
        let mut target = Target::new("www.google.com", 443);
        target.resolve().await.unwrap();

        let prober = CapabilityProber::new(target);
        let results = prober.probe_all().await;

        assert_eq!(results.len(), 4);
        assert!(results
            .iter()
            .any(|r| r.version == ProtocolVersion::Tls12 && r.supported));
        assert!(results
            .iter()
            .any(|r| r.version == ProtocolVersion::Tls13 && r.supported));
    }
}
