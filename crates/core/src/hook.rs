//! CDS Hooks service request body
//!
//! Every field is optional and read leniently: a value of the wrong JSON
//! type counts as absent, so it can only ever push an invocation onto the
//! 412 path, never fail the request outright.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::lenient;

/// Longest id the FHIR `id` datatype allows
const MAX_ID_LEN: usize = 64;

/// Whether `id` matches the FHIR id pattern `[A-Za-z0-9\-.]{1,64}`.
///
/// Ids made only of dots are refused as well; they are path traversal,
/// not resource ids.
pub fn is_fhir_id(id: &str) -> bool {
    (1..=MAX_ID_LEN).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
        && !id.bytes().all(|b| b == b'.')
}

/// Access token handed over by the EHR for reading from `fhirServer`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FhirAuthorization {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub access_token: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub token_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub scope: Option<String>,
}

/// Hook context
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub patient_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub user_id: Option<String>,
}

/// Parsed POST body of a service invocation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HookRequest {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub hook: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub hook_instance: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub fhir_server: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub fhir_authorization: Option<FhirAuthorization>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub context: Option<HookContext>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub prefetch: Option<Map<String, JsonValue>>,
}

impl HookRequest {
    /// Read an already-parsed body; anything but a JSON object is an empty request
    pub fn from_value(value: JsonValue) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// `(fhirServer, patientId)` when the server is non-empty and the
    /// patient id is a valid FHIR id
    pub fn fallback_target(&self) -> Option<(&str, &str)> {
        let server = self.fhir_server.as_deref().filter(|s| !s.is_empty())?;
        let patient = self
            .context
            .as_ref()
            .and_then(|c| c.patient_id.as_deref())
            .filter(|id| is_fhir_id(id))?;
        Some((server, patient))
    }

    pub fn access_token(&self) -> Option<&str> {
        self.fhir_authorization
            .as_ref()
            .and_then(|a| a.access_token.as_deref())
            .filter(|s| !s.is_empty())
    }
}
