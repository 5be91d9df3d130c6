// Audit poller - Periodic pull of the aggregate audit
use crate::application::events::{AuditEvent, DashboardEvent};
use crate::application::feeds::AuditSource;
use crate::domain::audit::{AuditRecord, AuditSnapshot};
use crate::domain::error::{AuditFetchError, ConfigurationError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Holds the latest successfully fetched audit. Fetches are tagged with a
/// per-start generation and an increasing sequence so stale results never
/// replace newer ones.
pub struct AuditPoller {
    source: Arc<dyn AuditSource>,
    events: mpsc::Sender<DashboardEvent>,
    fetch_timeout: Duration,
    next_generation: u64,
    active_generation: Option<u64>,
    task: Option<JoinHandle<()>>,
    latest: Option<AuditRecord>,
    last_applied_sequence: u64,
    consecutive_failures: u32,
}

impl AuditPoller {
    pub fn new(
        source: Arc<dyn AuditSource>,
        fetch_timeout: Duration,
        events: mpsc::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            source,
            events,
            fetch_timeout,
            next_generation: 0,
            active_generation: None,
            task: None,
            latest: None,
            last_applied_sequence: 0,
            consecutive_failures: 0,
        }
    }

    /// Fetch now, then every `interval` until stopped.
    pub fn start(&mut self, endpoint: &str, interval: Duration) -> Result<(), ConfigurationError> {
        if interval.is_zero() {
            return Err(ConfigurationError::ZeroInterval);
        }
        if self.task.is_some() {
            tracing::debug!(endpoint, "audit poller already running");
            return Ok(());
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.active_generation = Some(generation);
        self.last_applied_sequence = 0;

        tracing::info!(endpoint, interval_secs = interval.as_secs_f64(), "starting audit poller");
        self.task = Some(tokio::spawn(poll_loop(
            self.source.clone(),
            endpoint.to_string(),
            interval,
            self.fetch_timeout,
            generation,
            self.events.clone(),
        )));
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(generation = ?self.active_generation, "audit poller stopped");
        }
        self.active_generation = None;
    }

    /// Apply one fetch result. Returns true only when the snapshot was replaced.
    pub fn apply(&mut self, event: AuditEvent) -> bool {
        if self.active_generation != Some(event.generation) {
            tracing::debug!(generation = event.generation, "discarding audit result from stopped poller");
            return false;
        }

        match event.outcome {
            Ok(snapshot) => {
                if event.sequence <= self.last_applied_sequence {
                    tracing::debug!(
                        sequence = event.sequence,
                        latest = self.last_applied_sequence,
                        "discarding straggling audit response"
                    );
                    return false;
                }
                self.last_applied_sequence = event.sequence;
                self.consecutive_failures = 0;
                self.latest = Some(AuditRecord {
                    snapshot,
                    fetched_at: Utc::now(),
                    sequence: event.sequence,
                });
                tracing::debug!(sequence = event.sequence, "audit snapshot updated");
                true
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::warn!(
                    error = %e,
                    consecutive_failures = self.consecutive_failures,
                    "audit fetch failed; keeping previous snapshot"
                );
                false
            }
        }
    }

    pub fn latest(&self) -> Option<&AuditRecord> {
        self.latest.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn generation(&self) -> Option<u64> {
        self.active_generation
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for AuditPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn fetch_once(
    source: &dyn AuditSource,
    endpoint: &str,
    fetch_timeout: Duration,
) -> Result<AuditSnapshot, AuditFetchError> {
    let value = tokio::time::timeout(fetch_timeout, source.fetch(endpoint))
        .await
        .map_err(|_| AuditFetchError::Timeout(fetch_timeout))??;
    Ok(AuditSnapshot::from_value(value)?)
}

/// One fetch per tick, awaited before the next tick so fetches never overlap.
async fn poll_loop(
    source: Arc<dyn AuditSource>,
    endpoint: String,
    interval: Duration,
    fetch_timeout: Duration,
    generation: u64,
    events: mpsc::Sender<DashboardEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sequence: u64 = 0;

    loop {
        ticker.tick().await;
        sequence += 1;

        let outcome = fetch_once(source.as_ref(), &endpoint, fetch_timeout).await;
        let event = AuditEvent {
            generation,
            sequence,
            outcome,
        };
        if events.send(DashboardEvent::Audit(event)).await.is_err() {
            return;
        }
    }
}
