// Client-side state engine for the live grid dashboard
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::dashboard_service::{CoreSettings, Dashboard, DashboardView};
pub use domain::dashboard::{ConnectionStatus, DashboardViewModel};
