//! cds-core: CDS Hooks service model and card-building core
//!
//! Pure logic shared by the server: request and resource types, prefetch
//! validation, card builders and the service registry. No I/O happens here.

pub mod card;
pub mod discovery;
pub mod error;
pub mod hook;
mod lenient;
pub mod prefetch;
pub mod query;
pub mod resource;
pub mod service;

pub use card::{Card, CardResponse, Indicator, Link, Source};
pub use discovery::{DiscoveryResponse, ServiceDefinition};
pub use error::CdsError;
pub use hook::{FhirAuthorization, HookContext, HookRequest, is_fhir_id};
pub use prefetch::validate;
pub use query::FhirQuery;
pub use resource::{ClinicalResource, ResourceKind};
pub use service::{CdsService, ServiceRegistry};
