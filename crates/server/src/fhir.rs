//! Client for reading resources from the EHR's FHIR server

use cds_core::{CdsError, FhirQuery};
use reqwest::{Url, header};
use serde_json::Value as JsonValue;

const FHIR_JSON: &str = "application/json+fhir";

/// Thin wrapper around a shared `reqwest` client.
///
/// One call is one GET: no retries, no caching, and no timeout beyond the
/// transport default.
#[derive(Clone, Default)]
pub struct FhirClient {
    http: reqwest::Client,
}

impl FhirClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Resolve `query` against the server base URL.
    ///
    /// Path segments and search parameters are percent-encoded, so no
    /// value can step outside its segment or add parameters.
    pub fn url(base: &str, query: &FhirQuery) -> Result<Url, CdsError> {
        let mut url = Url::parse(base)
            .map_err(|e| CdsError::FetchFailure(format!("invalid fhirServer {}: {}", base, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CdsError::FetchFailure(format!(
                "unsupported fhirServer scheme: {}",
                url.scheme()
            )));
        }

        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| CdsError::FetchFailure(format!("fhirServer {} is not a base URL", base)))?
            .pop_if_empty()
            .extend(&query.path);
        if !query.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&query.params);
        }
        Ok(url)
    }

    /// GET `query` from the server at `base` and return the JSON body
    pub async fn fetch(
        &self,
        base: &str,
        query: &FhirQuery,
        access_token: Option<&str>,
    ) -> Result<JsonValue, CdsError> {
        let url = Self::url(base, query)?;
        let mut request = self.http.get(url.clone()).header(header::ACCEPT, FHIR_JSON);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CdsError::FetchFailure(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CdsError::FetchFailure(format!("GET {} returned {}", url, status)));
        }

        response.json::<JsonValue>().await.map_err(|e| {
            CdsError::FetchFailure(format!("GET {} returned invalid JSON: {}", url, e))
        })
    }
}
