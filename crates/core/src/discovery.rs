//! CDS Hooks discovery document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the discovery document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub hook: String,
    pub id: String,
    pub title: String,
    pub description: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefetch: BTreeMap<String, String>,
}

/// Body of `GET /cds-services`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryResponse {
    pub services: Vec<ServiceDefinition>,
}
