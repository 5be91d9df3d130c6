// HTTP request handlers
use crate::domain::dashboard::DashboardViewModel;
use crate::presentation::app_state::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current view model
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<Arc<DashboardViewModel>> {
    Json(state.view.current())
}

/// Server-sent events, one per view model change. Ends when the dashboard shuts down.
pub async fn stream_dashboard(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut view = state.view.clone();

    let stream = async_stream::stream! {
        yield dashboard_event(&view.latest());
        while let Some(model) = view.changed().await {
            yield dashboard_event(&model);
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn dashboard_event(model: &DashboardViewModel) -> Result<Event, axum::Error> {
    Event::default().event("dashboard").json_data(model)
}
