// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardView;

#[derive(Clone)]
pub struct AppState {
    pub view: DashboardView,
}
