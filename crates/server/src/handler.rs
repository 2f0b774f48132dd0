//! Generic CDS service handler
//!
//! Serves cards from the prefetch bundle when it holds a complete resource,
//! otherwise fetches the resource live from the EHR's FHIR server.

use cds_core::{CardResponse, CdsError, CdsService, HookRequest, prefetch};

use crate::fhir::FhirClient;

/// Run one service invocation
pub async fn invoke(
    service: &CdsService,
    request: &HookRequest,
    client: &FhirClient,
) -> Result<CardResponse, CdsError> {
    match prefetch::validate(request.prefetch.as_ref(), service.prefetch_key, service.resource) {
        Ok(resource) => {
            tracing::debug!(service = service.id(), "Serving cards from prefetch");
            return Ok((service.build)(&resource).into());
        }
        Err(e) => {
            tracing::debug!(
                service = service.id(),
                reason = %e,
                "Prefetch unusable, falling back to FHIR server"
            );
        }
    }

    let (server, patient_id) = request
        .fallback_target()
        .ok_or(CdsError::MissingFallbackParameters)?;

    let query = (service.query)(patient_id);
    let value = client.fetch(server, &query, request.access_token()).await?;

    let resource = service.resource.complete(&value).ok_or_else(|| {
        CdsError::FetchFailure(format!("{} returned an incomplete resource", query))
    })?;

    tracing::debug!(service = service.id(), "Serving cards from FHIR server");
    Ok((service.build)(&resource).into())
}
