use thiserror::Error;

/// Failures a CDS service invocation can run into.
///
/// None of these is fatal to the process; each is scoped to one request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CdsError {
    /// Prefetch entry absent or incomplete. Triggers the live-fetch fallback.
    #[error("Prefetch `{0}` is missing or incomplete")]
    InvalidPrefetch(String),

    #[error("Request carries no fhirServer and context.patientId to fall back on")]
    MissingFallbackParameters,

    #[error("FHIR fetch failed: {0}")]
    FetchFailure(String),
}
