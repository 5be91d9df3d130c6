// Dashboard view model handed to presentation
use super::audit::{AuditSnapshot, Suggestion};
use super::telemetry::{EnergyMix, StabilityHealth, TelemetrySample};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Live subscription state, owned by the stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Reconnecting,
    Closed,
}

/// Immutable snapshot of everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViewModel {
    pub revision: u64,
    pub connection: ConnectionStatus,
    pub series: Arc<[TelemetrySample]>,
    pub current: Option<CurrentReading>,
    pub audit: AuditView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReading {
    pub sample: TelemetrySample,
    pub stability_percent: f64,
    pub health: StabilityHealth,
    pub energy_mix: EnergyMix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuditView {
    Pending,
    Ready {
        snapshot: AuditSnapshot,
        fetched_at: DateTime<Utc>,
        suggestions: Vec<Suggestion>,
    },
}

impl DashboardViewModel {
    /// View before anything has arrived.
    pub fn empty() -> Self {
        Self {
            revision: 0,
            connection: ConnectionStatus::Closed,
            series: Arc::from(Vec::<TelemetrySample>::new()),
            current: None,
            audit: AuditView::Pending,
        }
    }
}
