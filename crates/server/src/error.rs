//! Application error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cds_core::CdsError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// No service registered under the requested id
    ServiceNotFound(String),
    /// The invocation could not be served from prefetch or a live fetch
    Cds(CdsError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ServiceNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("No CDS service '{}'", id)).into_response()
            }
            // CDS clients are expected to resend with valid prefetch, not parse a reason
            AppError::Cds(_) => StatusCode::PRECONDITION_FAILED.into_response(),
        }
    }
}

impl From<CdsError> for AppError {
    fn from(err: CdsError) -> Self {
        AppError::Cds(err)
    }
}
