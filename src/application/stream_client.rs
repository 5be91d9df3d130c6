// Stream client - Live subscription with reconnect and sample ingestion
use crate::application::events::{DashboardEvent, StreamEvent, StreamEventKind};
use crate::application::feeds::TelemetryFeed;
use crate::domain::dashboard::ConnectionStatus;
use crate::domain::error::ConfigurationError;
use crate::domain::telemetry::TelemetrySample;
use crate::domain::window::SampleWindow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Exponential backoff between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.initial_delay.is_zero() {
            return Err(ConfigurationError::ReconnectPolicy(
                "initial delay must be greater than zero".to_string(),
            ));
        }
        if self.max_delay < self.initial_delay {
            return Err(ConfigurationError::ReconnectPolicy(
                "max delay must not be below the initial delay".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigurationError::ReconnectPolicy(
                "multiplier must be a finite number >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// Owns the live subscription, its status and the sample window it feeds.
pub struct StreamClient {
    feed: Arc<dyn TelemetryFeed>,
    policy: ReconnectPolicy,
    events: mpsc::Sender<DashboardEvent>,
    window: SampleWindow,
    status: ConnectionStatus,
    next_session: u64,
    active_session: Option<u64>,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    pub fn new(
        feed: Arc<dyn TelemetryFeed>,
        policy: ReconnectPolicy,
        window_capacity: usize,
        events: mpsc::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            feed,
            policy,
            events,
            window: SampleWindow::new(window_capacity),
            status: ConnectionStatus::Closed,
            next_session: 0,
            active_session: None,
            task: None,
        }
    }

    /// Begin connecting. Does nothing while a session is already running.
    pub fn start(&mut self, endpoint: &str) {
        if self.task.is_some() {
            tracing::debug!(endpoint, "stream client already running");
            return;
        }

        self.next_session += 1;
        let session = self.next_session;
        self.active_session = Some(session);
        self.status = ConnectionStatus::Connecting;

        tracing::info!(endpoint, session, "starting telemetry stream");
        self.task = Some(tokio::spawn(run_session(
            self.feed.clone(),
            endpoint.to_string(),
            self.policy,
            session,
            self.events.clone(),
        )));
    }

    /// Release the subscription and any pending reconnect. Events still queued
    /// from the stopped session are discarded by `apply`.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(session = ?self.active_session, "telemetry stream stopped");
        }
        self.active_session = None;
        self.status = ConnectionStatus::Closed;
    }

    /// Apply one event from a session. Returns whether observable state changed.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        if self.active_session != Some(event.session) {
            tracing::debug!(session = event.session, "discarding event from inactive stream session");
            return false;
        }

        match event.kind {
            StreamEventKind::Status(status) => {
                if status == self.status {
                    return false;
                }
                tracing::debug!(from = ?self.status, to = ?status, "connection status changed");
                self.status = status;
                true
            }
            StreamEventKind::Sample(sample) => {
                self.window.append(sample);
                true
            }
        }
    }

    /// Clear the live window. Only done on a full session reset.
    pub fn clear_window(&mut self) {
        self.window.clear();
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn emit(events: &mpsc::Sender<DashboardEvent>, session: u64, kind: StreamEventKind) -> bool {
    events
        .send(DashboardEvent::Stream(StreamEvent { session, kind }))
        .await
        .is_ok()
}

/// Connect, forward validated samples, and reconnect with backoff until aborted.
async fn run_session(
    feed: Arc<dyn TelemetryFeed>,
    endpoint: String,
    policy: ReconnectPolicy,
    session: u64,
    events: mpsc::Sender<DashboardEvent>,
) {
    let mut attempt: u32 = 0;

    loop {
        match feed.connect(&endpoint).await {
            Ok(mut connection) => {
                attempt = 0;
                tracing::info!(endpoint = %endpoint, "telemetry stream open");
                if !emit(&events, session, StreamEventKind::Status(ConnectionStatus::Open)).await {
                    return;
                }

                loop {
                    match connection.next_message().await {
                        Some(Ok(payload)) => match TelemetrySample::from_json(&payload) {
                            Ok(sample) => {
                                if !emit(&events, session, StreamEventKind::Sample(sample)).await {
                                    return;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "dropping malformed telemetry sample");
                            }
                        },
                        Some(Err(e)) => {
                            tracing::warn!(endpoint = %endpoint, error = %e, "telemetry stream dropped");
                            break;
                        }
                        None => {
                            tracing::warn!(endpoint = %endpoint, "telemetry stream closed by peer");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "telemetry connect failed");
            }
        }

        if !emit(&events, session, StreamEventKind::Status(ConnectionStatus::Reconnecting)).await {
            return;
        }

        attempt = attempt.saturating_add(1);
        let delay = policy.delay_for(attempt);
        tracing::info!(endpoint = %endpoint, attempt, delay_ms = delay.as_millis() as u64, "scheduling reconnect");
        tokio::time::sleep(delay).await;
    }
}
