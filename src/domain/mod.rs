// Domain layer - Telemetry, audit and view model types
pub mod audit;
pub mod dashboard;
pub mod error;
pub mod telemetry;
pub mod window;
