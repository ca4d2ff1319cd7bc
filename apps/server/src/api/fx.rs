use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tickerfolio_core::fx::ExchangeRate;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateResponse {
    base_currency: String,
    display_currency: String,
    available: bool,
    rate: Option<ExchangeRate>,
}

async fn get_rate(State(state): State<Arc<AppState>>) -> Json<RateResponse> {
    let rate = state.fx_service.cached_rate().await;
    Json(RateResponse {
        base_currency: state.fx_service.base_currency().to_string(),
        display_currency: state.fx_service.display_currency().to_string(),
        available: rate.is_some(),
        rate,
    })
}

async fn refresh_rate(State(state): State<Arc<AppState>>) -> ApiResult<Json<ExchangeRate>> {
    let rate = state.fx_service.refresh_rate().await?;
    Ok(Json(rate))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fx/rate", get(get_rate))
        .route("/fx/rate/refresh", post(refresh_rate))
}
