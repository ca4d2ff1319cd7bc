use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tickerfolio_core::{
    errors::Error,
    history::{ChartCurrency, PortfolioChart},
    portfolios::{Portfolio, PortfolioView},
    sync::RefreshSummary,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePortfolioRequest {
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BusyResponse {
    portfolio_id: String,
    busy: bool,
}

#[derive(Deserialize)]
struct ChartQuery {
    #[serde(default)]
    currency: ChartCurrency,
}

/// Portfolio with totals, converted when a rate is cached.
pub(super) async fn to_view(state: &AppState, portfolio: &Portfolio) -> PortfolioView {
    let rate = state.fx_service.cached_rate().await;
    PortfolioView::new(portfolio, rate.as_ref())
}

pub(super) async fn find_portfolio(state: &AppState, id: &str) -> ApiResult<Portfolio> {
    state
        .portfolio_service
        .portfolio(id)
        .await
        .ok_or_else(|| Error::NotFound(format!("portfolio {}", id)).into())
}

async fn list_portfolios(State(state): State<Arc<AppState>>) -> Json<Vec<PortfolioView>> {
    let snapshot = state.portfolio_service.snapshot().await;
    let rate = state.fx_service.cached_rate().await;
    Json(
        snapshot
            .portfolios()
            .iter()
            .map(|p| PortfolioView::new(p, rate.as_ref()))
            .collect(),
    )
}

async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePortfolioRequest>,
) -> ApiResult<(StatusCode, Json<PortfolioView>)> {
    let portfolio = state.portfolio_service.add_portfolio(&body.name).await?;
    Ok((StatusCode::CREATED, Json(to_view(&state, &portfolio).await)))
}

async fn get_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioView>> {
    let portfolio = find_portfolio(&state, &id).await?;
    Ok(Json(to_view(&state, &portfolio).await))
}

async fn delete_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.portfolio_service.remove_portfolio(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Refreshes every holding; per-symbol failures are reported in the summary.
async fn refresh_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RefreshSummary>> {
    let summary = state.sync_engine.refresh_portfolio(&id).await?;
    Ok(Json(summary))
}

async fn get_busy(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BusyResponse>> {
    find_portfolio(&state, &id).await?;
    Ok(Json(BusyResponse {
        busy: state.sync_engine.is_busy(&id),
        portfolio_id: id,
    }))
}

async fn get_chart(
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioChart>> {
    let chart = state
        .history_service
        .portfolio_chart(&id, query.currency)
        .await?;
    Ok(Json(chart))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios).post(create_portfolio))
        .route(
            "/portfolios/{id}",
            get(get_portfolio).delete(delete_portfolio),
        )
        .route("/portfolios/{id}/refresh", post(refresh_portfolio))
        .route("/portfolios/{id}/busy", get(get_busy))
        .route("/portfolios/{id}/chart", get(get_chart))
}
