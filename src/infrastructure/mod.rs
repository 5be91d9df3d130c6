// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_audit_source;
pub mod websocket_feed;
