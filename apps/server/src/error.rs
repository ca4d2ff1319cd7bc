use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tickerfolio_core::errors::Error as CoreError;
use tickerfolio_core::ErrorKind;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    kind: &'static str,
    message: String,
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound | ErrorKind::SymbolNotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateSymbol | ErrorKind::AlreadyInProgress => StatusCode::CONFLICT,
        ErrorKind::CapacityExceeded => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Provider => StatusCode::BAD_GATEWAY,
        ErrorKind::RateUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::Core(e) => (status_for(e.kind()), e.kind().code()),
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            kind,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
