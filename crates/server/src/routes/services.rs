//! CDS Hooks discovery and service endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use cds_core::{CardResponse, DiscoveryResponse, HookRequest};
use serde_json::Value as JsonValue;

use super::Pretty;
use crate::AppState;
use crate::error::AppError;
use crate::handler;

/// GET /cds-services - List the services this server offers
pub async fn discovery(State(state): State<AppState>) -> Pretty<DiscoveryResponse> {
    Pretty(state.registry.discovery())
}

/// POST /cds-services/{id} - Invoke a service and return its cards
///
/// Only unparsable JSON is rejected here; fields of the wrong type are
/// treated as absent by `HookRequest`.
pub async fn invoke(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<JsonValue>,
) -> Result<Pretty<CardResponse>, AppError> {
    let service = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::ServiceNotFound(id.clone()))?;

    let body = HookRequest::from_value(body);
    match handler::invoke(service, &body, &state.fhir).await {
        Ok(response) => {
            tracing::info!(service = %id, cards = response.cards.len(), "CDS service responded");
            Ok(Pretty(response))
        }
        Err(e) => {
            tracing::warn!(service = %id, error = %e, "CDS service precondition failed");
            Err(e.into())
        }
    }
}
