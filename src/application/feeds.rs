// Transport seams for the live feed and the audit service
use crate::domain::error::TransportError;
use async_trait::async_trait;

/// Opens live telemetry subscriptions.
#[async_trait]
pub trait TelemetryFeed: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn TelemetryConnection>, TransportError>;
}

/// One established subscription.
#[async_trait]
pub trait TelemetryConnection: Send {
    /// Next inbound text payload. `None` means the peer closed the connection;
    /// an error means it dropped.
    async fn next_message(&mut self) -> Option<Result<String, TransportError>>;
}

/// Request/response access to the aggregate audit.
#[async_trait]
pub trait AuditSource: Send + Sync {
    /// Fetch the raw audit document. Shape validation happens in the core.
    async fn fetch(&self, endpoint: &str) -> Result<serde_json::Value, TransportError>;
}
