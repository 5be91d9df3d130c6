// In-memory transports for exercising the core without a network
use crate::application::events::{AuditEvent, DashboardEvent, StreamEvent};
use crate::application::feeds::{AuditSource, TelemetryConnection, TelemetryFeed};
use crate::domain::error::TransportError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub type ConnectionHandle = mpsc::UnboundedSender<Result<String, TransportError>>;

/// Hands out queued connections in order; refuses once the queue is empty.
#[derive(Default)]
pub struct ScriptedFeed {
    connections: Mutex<VecDeque<ScriptedConnection>>,
    attempts: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a connection. Sending on the handle delivers a message, dropping
    /// it closes the connection.
    pub fn push_connection(&self) -> ConnectionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .lock()
            .unwrap()
            .push_back(ScriptedConnection { rx });
        tx
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

struct ScriptedConnection {
    rx: mpsc::UnboundedReceiver<Result<String, TransportError>>,
}

#[async_trait]
impl TelemetryFeed for ScriptedFeed {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn TelemetryConnection>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.connections.lock().unwrap().pop_front();
        match next {
            Some(connection) => Ok(Box::new(connection)),
            None => Err(TransportError::Connect {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

#[async_trait]
impl TelemetryConnection for ScriptedConnection {
    async fn next_message(&mut self) -> Option<Result<String, TransportError>> {
        self.rx.recv().await
    }
}

/// Replays queued responses, optionally after a delay, and records how many
/// fetches overlapped.
#[derive(Default)]
pub struct ScriptedAuditSource {
    responses: Mutex<VecDeque<Result<serde_json::Value, TransportError>>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedAuditSource {
    pub fn new(responses: Vec<Result<serde_json::Value, TransportError>>) -> Arc<Self> {
        Self::with_delay(responses, Duration::ZERO)
    }

    pub fn with_delay(
        responses: Vec<Result<serde_json::Value, TransportError>>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            delay,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditSource for ScriptedAuditSource {
    async fn fetch(&self, endpoint: &str) -> Result<serde_json::Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(TransportError::Request {
                endpoint: endpoint.to_string(),
                reason: "no scripted response".to_string(),
            })
        })
    }
}

pub fn audit_json(peak_demand: f64) -> serde_json::Value {
    serde_json::json!({
        "total_consumption_24h": 2400.0,
        "peak_demand": peak_demand,
        "renewable_percentage": 42.5,
        "efficiency_score": 0.88,
        "optimization_suggestions": ["Shift flexible load to midday", "Wind output trending up", "Feeder 3 near limit"]
    })
}

pub fn fetch_failure() -> Result<serde_json::Value, TransportError> {
    Err(TransportError::Status {
        endpoint: "http://grid.test/api/energy-audit".to_string(),
        status: 503,
    })
}

pub async fn next_event(rx: &mut mpsc::Receiver<DashboardEvent>) -> DashboardEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

pub async fn next_stream_event(rx: &mut mpsc::Receiver<DashboardEvent>) -> StreamEvent {
    match next_event(rx).await {
        DashboardEvent::Stream(event) => event,
        other => panic!("expected stream event, got {other:?}"),
    }
}

pub async fn next_audit_event(rx: &mut mpsc::Receiver<DashboardEvent>) -> AuditEvent {
    match next_event(rx).await {
        DashboardEvent::Audit(event) => event,
        other => panic!("expected audit event, got {other:?}"),
    }
}
