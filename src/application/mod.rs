// Application layer - Stream client, audit poller and the dashboard event loop
pub mod audit_poller;
pub mod dashboard_service;
pub mod events;
pub mod feeds;
pub mod stream_client;
pub mod view_model;

#[cfg(test)]
pub(crate) mod testing;
