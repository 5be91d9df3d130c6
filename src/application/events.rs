// Typed events placed on the dashboard's single event queue
use crate::domain::audit::AuditSnapshot;
use crate::domain::dashboard::ConnectionStatus;
use crate::domain::error::AuditFetchError;
use crate::domain::telemetry::TelemetrySample;

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Stream(StreamEvent),
    Audit(AuditEvent),
}

/// Emitted by a stream session. `session` identifies the `start` call that
/// spawned it, so events from a stopped session can be told apart.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub session: u64,
    pub kind: StreamEventKind,
}

#[derive(Debug, Clone)]
pub enum StreamEventKind {
    Status(ConnectionStatus),
    Sample(TelemetrySample),
}

/// Result of one audit fetch, tagged with the poller generation and the
/// fetch's issue sequence.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub generation: u64,
    pub sequence: u64,
    pub outcome: Result<AuditSnapshot, AuditFetchError>,
}
