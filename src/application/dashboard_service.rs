// Dashboard service - Single event loop reconciling the live stream and the audit
use crate::application::audit_poller::AuditPoller;
use crate::application::events::DashboardEvent;
use crate::application::feeds::{AuditSource, TelemetryFeed};
use crate::application::stream_client::{ReconnectPolicy, StreamClient};
use crate::application::view_model::assemble;
use crate::domain::dashboard::{ConnectionStatus, DashboardViewModel};
use crate::domain::error::ConfigurationError;
use crate::infrastructure::config::{AUDIT_SCHEMES, STREAM_SCHEMES, validate_endpoint};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const DEFAULT_EVENT_QUEUE: usize = 256;

/// Tuning for the core that is not tied to a particular endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSettings {
    pub window_capacity: usize,
    pub reconnect: ReconnectPolicy,
    pub fetch_timeout: Duration,
    pub event_queue: usize,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            window_capacity: 21,
            reconnect: ReconnectPolicy::default(),
            fetch_timeout: Duration::from_secs(10),
            event_queue: DEFAULT_EVENT_QUEUE,
        }
    }
}

impl CoreSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.window_capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigurationError::ZeroTimeout);
        }
        self.reconnect.validate()
    }
}

/// Read handle given to presentation.
#[derive(Clone)]
pub struct DashboardView {
    rx: watch::Receiver<Arc<DashboardViewModel>>,
}

impl DashboardView {
    /// The current view model.
    pub fn current(&self) -> Arc<DashboardViewModel> {
        self.rx.borrow().clone()
    }

    /// The current view model, marking it as seen for `changed`.
    pub fn latest(&mut self) -> Arc<DashboardViewModel> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next view model. `None` once the dashboard is gone.
    pub async fn changed(&mut self) -> Option<Arc<DashboardViewModel>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Owns the stream client and audit poller and applies their events one at a
/// time. All state mutation happens through `&mut self`, so whoever drives the
/// dashboard is the only thread of execution touching its state.
pub struct Dashboard {
    stream: StreamClient,
    audit: AuditPoller,
    events: mpsc::Receiver<DashboardEvent>,
    view: watch::Sender<Arc<DashboardViewModel>>,
    revision: u64,
}

impl Dashboard {
    pub fn new(
        feed: Arc<dyn TelemetryFeed>,
        source: Arc<dyn AuditSource>,
        settings: &CoreSettings,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;

        let (tx, events) = mpsc::channel(settings.event_queue.max(1));
        let stream = StreamClient::new(feed, settings.reconnect, settings.window_capacity, tx.clone());
        let audit = AuditPoller::new(source, settings.fetch_timeout, tx);
        let (view, _) = watch::channel(Arc::new(DashboardViewModel::empty()));

        Ok(Self {
            stream,
            audit,
            events,
            view,
            revision: 0,
        })
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            rx: self.view.subscribe(),
        }
    }

    pub fn snapshot(&self) -> Arc<DashboardViewModel> {
        self.view.borrow().clone()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.stream.status()
    }

    pub fn start_stream(&mut self, endpoint: &str) -> Result<(), ConfigurationError> {
        validate_endpoint(endpoint, STREAM_SCHEMES)?;
        let before = self.stream.status();
        self.stream.start(endpoint);
        if self.stream.status() != before {
            self.publish();
        }
        Ok(())
    }

    pub fn stop_stream(&mut self) {
        let before = self.stream.status();
        self.stream.stop();
        if self.stream.status() != before {
            self.publish();
        }
    }

    pub fn start_audit(&mut self, endpoint: &str, interval: Duration) -> Result<(), ConfigurationError> {
        validate_endpoint(endpoint, AUDIT_SCHEMES)?;
        self.audit.start(endpoint, interval)
    }

    pub fn stop_audit(&mut self) {
        self.audit.stop();
    }

    /// Full session reset: empties the live window. The audit is kept.
    pub fn reset(&mut self) {
        self.stream.clear_window();
        self.publish();
    }

    /// Apply one event; republish the view model if anything changed.
    pub fn handle(&mut self, event: DashboardEvent) -> bool {
        let changed = match event {
            DashboardEvent::Stream(event) => self.stream.apply(event),
            DashboardEvent::Audit(event) => self.audit.apply(event),
        };
        if changed {
            self.publish();
        }
        changed
    }

    /// Wait for and apply the next queued event.
    pub async fn process_next(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => self.handle(event),
            None => false,
        }
    }

    /// Drive the event loop until `shutdown` resolves, then stop both sources.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(event) = self.events.recv() => {
                    self.handle(event);
                }
            }
        }
        tracing::info!("dashboard shutting down");
        self.shutdown();
    }

    pub fn shutdown(&mut self) {
        self.audit.stop();
        self.stop_stream();
    }

    fn publish(&mut self) {
        self.revision += 1;
        let model = assemble(
            self.stream.window(),
            self.stream.status(),
            self.audit.latest(),
            self.revision,
        );
        self.view.send_replace(Arc::new(model));
    }
}
