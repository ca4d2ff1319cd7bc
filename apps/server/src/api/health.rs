use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use tickerfolio_core::persistence::PersistenceStatus;

async fn healthz() -> &'static str {
    "ok"
}

/// Whether the durable mirror is keeping up.
async fn persistence_status(State(state): State<Arc<AppState>>) -> Json<PersistenceStatus> {
    Json(state.portfolio_service.persistence_status().await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/persistence", get(persistence_status))
}
