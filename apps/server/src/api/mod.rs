mod events;
mod fx;
mod health;
mod holdings;
mod portfolios;

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, main_lib::AppState};

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let allow_origin = if config.cors_allow.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(origins)
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .merge(health::router())
        .merge(portfolios::router())
        .merge(holdings::router())
        .merge(fx::router())
        .merge(events::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
