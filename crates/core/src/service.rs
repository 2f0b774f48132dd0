//! Registry of the CDS services this server offers.
//!
//! Each service pairs a prefetch key with the query used to fetch the same
//! data live and the builder that turns it into cards. A single generic
//! handler drives all of them.

use std::collections::BTreeMap;

use crate::card::{self, Card};
use crate::discovery::{DiscoveryResponse, ServiceDefinition};
use crate::query::FhirQuery;
use crate::resource::{ClinicalResource, ResourceKind};

const PATIENT_VIEW: &str = "patient-view";

/// SNOMED CT concept for essential hypertension
const HYPERTENSION_CODE: &str = "http://snomed.info/sct|38341003";

/// A CDS service: discovery metadata plus its validator key, fetch query and card builder
#[derive(Clone)]
pub struct CdsService {
    pub definition: ServiceDefinition,
    pub prefetch_key: &'static str,
    pub resource: ResourceKind,
    pub query: fn(&str) -> FhirQuery,
    pub build: fn(&ClinicalResource) -> Vec<Card>,
}

impl CdsService {
    pub fn id(&self) -> &str {
        &self.definition.id
    }
}

fn patient_query(patient_id: &str) -> FhirQuery {
    FhirQuery::read("Patient", patient_id)
}

fn condition_query(patient_id: &str) -> FhirQuery {
    FhirQuery::search("Condition")
        .param("patient", patient_id)
        .param("code", HYPERTENSION_CODE)
}

fn immunization_query(patient_id: &str) -> FhirQuery {
    FhirQuery::search("Immunization")
        .param("patient", patient_id)
        .param("status", "completed")
        .param("vaccine-code:text", "flu,influenza")
        .param("_sort", "-date")
}

fn definition(
    id: &str,
    title: &str,
    description: &str,
    prefetch_key: &str,
    query: fn(&str) -> FhirQuery,
) -> ServiceDefinition {
    let mut prefetch = BTreeMap::new();
    prefetch.insert(
        prefetch_key.to_string(),
        query("{{context.patientId}}").to_string(),
    );
    ServiceDefinition {
        hook: PATIENT_VIEW.to_string(),
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        prefetch,
    }
}

fn service(
    id: &str,
    title: &str,
    description: &str,
    prefetch_key: &'static str,
    resource: ResourceKind,
    query: fn(&str) -> FhirQuery,
    build: fn(&ClinicalResource) -> Vec<Card>,
) -> CdsService {
    CdsService {
        definition: definition(id, title, description, prefetch_key, query),
        prefetch_key,
        resource,
        query,
        build,
    }
}

/// Immutable set of services, keyed by id
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<CdsService>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<CdsService>) -> Self {
        Self { services }
    }

    /// The greeting, hypertension and flu vaccine services
    pub fn standard() -> Self {
        Self::new(vec![
            service(
                "patient-view-example",
                "Example patient-view CDS Service",
                "Greets the clinician with the name and birth date of the patient in context",
                "patient",
                ResourceKind::Patient,
                patient_query,
                card::patient_greeting,
            ),
            service(
                "patient-hypertension-warning",
                "Example hypertension CDS Service",
                "Warns the clinician when the patient has hypertension on record",
                "conditions",
                ResourceKind::ConditionSearch,
                condition_query,
                card::hypertension_warning,
            ),
            service(
                "patient-vaccine-reminder",
                "Example flu-vaccine CDS Service",
                "Suggests clinician to recommend flu vaccine",
                "immunizations",
                ResourceKind::ImmunizationSearch,
                immunization_query,
                card::flu_vaccine_reminder,
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&CdsService> {
        self.services.iter().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CdsService> {
        self.services.iter()
    }

    /// Discovery document listing every registered service
    pub fn discovery(&self) -> DiscoveryResponse {
        DiscoveryResponse {
            services: self.services.iter().map(|s| s.definition.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_three_patient_view_services() {
        let registry = ServiceRegistry::standard();
        let discovery = registry.discovery();
        let ids: Vec<_> = discovery.services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "patient-view-example",
                "patient-hypertension-warning",
                "patient-vaccine-reminder"
            ]
        );
        assert!(discovery.services.iter().all(|s| s.hook == "patient-view"));
    }

    #[test]
    fn prefetch_templates_match_fetch_queries() {
        let registry = ServiceRegistry::standard();
        let vaccine = registry.get("patient-vaccine-reminder").unwrap();
        assert_eq!(
            vaccine.definition.prefetch["immunizations"],
            "Immunization?patient={{context.patientId}}&status=completed&vaccine-code:text=flu,influenza&_sort=-date"
        );
        assert_eq!(
            (vaccine.query)("42").to_string(),
            vaccine.definition.prefetch["immunizations"].replace("{{context.patientId}}", "42")
        );

        let greeting = registry.get("patient-view-example").unwrap();
        assert_eq!((greeting.query)("42").to_string(), "Patient/42");
        assert_eq!(greeting.definition.prefetch["patient"], "Patient/{{context.patientId}}");

        let hypertension = registry.get("patient-hypertension-warning").unwrap();
        assert_eq!(
            (hypertension.query)("42").to_string(),
            "Condition?patient=42&code=http://snomed.info/sct|38341003"
        );
    }

    #[test]
    fn every_builder_accepts_its_own_resource_kind() {
        let registry = ServiceRegistry::standard();
        let samples = [
            (
                "patient-view-example",
                serde_json::json!({"name": [{"given": ["A"], "family": ["B"]}], "birthDate": "2000-01-01"}),
            ),
            ("patient-hypertension-warning", serde_json::json!({"total": 1})),
            ("patient-vaccine-reminder", serde_json::json!({"total": 0})),
        ];
        for (id, value) in samples {
            let svc = registry.get(id).unwrap();
            let resource = svc.resource.complete(&value).unwrap();
            assert_eq!((svc.build)(&resource).len(), 1, "{id}");
        }
    }

    #[test]
    fn unknown_service_is_absent() {
        assert!(ServiceRegistry::standard().get("order-select").is_none());
    }
}
