use std::sync::Arc;

use crate::{
    api::portfolios::{find_portfolio, to_view},
    error::ApiResult,
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tickerfolio_core::{
    errors::Error,
    history::HoldingSeries,
    portfolios::{Holding, PortfolioView},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddHoldingRequest {
    symbol: String,
    quantity: u32,
}

/// Adds a symbol priced from a fresh quote.
async fn add_holding(
    Path(portfolio_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddHoldingRequest>,
) -> ApiResult<(StatusCode, Json<Holding>)> {
    let holding = state
        .sync_engine
        .add_symbol_to_portfolio(&portfolio_id, &body.symbol, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(holding)))
}

async fn remove_selected(
    Path(portfolio_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioView>> {
    state
        .portfolio_service
        .remove_selected_holdings(&portfolio_id)
        .await?;
    let portfolio = find_portfolio(&state, &portfolio_id).await?;
    Ok(Json(to_view(&state, &portfolio).await))
}

async fn toggle_selection(
    Path((portfolio_id, holding_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Holding>> {
    let snapshot = state
        .portfolio_service
        .toggle_holding_selection(&portfolio_id, &holding_id)
        .await?;
    snapshot
        .portfolio(&portfolio_id)
        .and_then(|p| p.holding(&holding_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("holding {}", holding_id)).into())
}

async fn refresh_holding(
    Path((portfolio_id, holding_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Holding>> {
    let holding = state
        .sync_engine
        .refresh_holding(&portfolio_id, &holding_id)
        .await?;
    Ok(Json(holding))
}

async fn holding_history(
    Path((portfolio_id, holding_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HoldingSeries>> {
    let series = state
        .history_service
        .holding_series(&portfolio_id, &holding_id)
        .await?;
    Ok(Json(series))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios/{id}/holdings", post(add_holding))
        .route("/portfolios/{id}/holdings/selected", delete(remove_selected))
        .route(
            "/portfolios/{id}/holdings/{holding_id}/toggle",
            post(toggle_selection),
        )
        .route(
            "/portfolios/{id}/holdings/{holding_id}/refresh",
            post(refresh_holding),
        )
        .route(
            "/portfolios/{id}/holdings/{holding_id}/history",
            get(holding_history),
        )
}
