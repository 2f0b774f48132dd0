pub mod health;
pub mod metrics;
pub mod services;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::AppState;

/// Discovery route (public)
pub fn discovery_routes() -> Router<AppState> {
    Router::new().route("/cds-services", get(services::discovery))
}

/// Service invocation routes
pub fn service_routes() -> Router<AppState> {
    Router::new().route("/cds-services/{id}", post(services::invoke))
}

/// JSON response indented with two spaces
pub struct Pretty<T>(pub T);

impl<T: Serialize> IntoResponse for Pretty<T> {
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self.0) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
