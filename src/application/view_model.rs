// View model assembly - Pure projection of core state
use crate::domain::audit::AuditRecord;
use crate::domain::dashboard::{AuditView, ConnectionStatus, CurrentReading, DashboardViewModel};
use crate::domain::window::SampleWindow;

pub fn assemble(
    window: &SampleWindow,
    connection: ConnectionStatus,
    audit: Option<&AuditRecord>,
    revision: u64,
) -> DashboardViewModel {
    let current = window.current().map(|sample| CurrentReading {
        stability_percent: sample.grid_stability * 100.0,
        health: sample.stability_health(),
        energy_mix: sample.energy_mix(),
        sample: sample.clone(),
    });

    let audit = match audit {
        Some(record) => AuditView::Ready {
            suggestions: record.snapshot.ranked_suggestions(),
            snapshot: record.snapshot.clone(),
            fetched_at: record.fetched_at,
        },
        None => AuditView::Pending,
    };

    DashboardViewModel {
        revision,
        connection,
        series: window.snapshot(),
        current,
        audit,
    }
}
