//! Clinical resources consumed by the card builders.
//!
//! Resources arrive as loose JSON, either embedded in the prefetch bundle or
//! fetched from the FHIR server. [`ResourceKind::complete`] is the only way to
//! obtain a [`ClinicalResource`], so anything that reaches a card builder has
//! already passed its completeness check.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

use crate::lenient;

/// A field that DSTU2 encodes as an array and R4 as a single value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// First value, if any
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.first(),
        }
    }
}

/// FHIR HumanName (only the parts the greeting needs)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HumanName {
    #[serde(default)]
    pub given: Vec<String>,

    #[serde(default)]
    pub family: Option<OneOrMany<String>>,
}

/// FHIR Patient resource (simplified)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatientResource {
    #[serde(default)]
    pub name: Vec<HumanName>,

    #[serde(default)]
    pub birth_date: Option<String>,
}

impl PatientResource {
    /// First given name of the first HumanName
    pub fn given(&self) -> Option<&str> {
        self.name
            .first()
            .and_then(|n| n.given.first())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// First family name of the first HumanName
    pub fn family(&self) -> Option<&str> {
        self.name
            .first()
            .and_then(|n| n.family.as_ref())
            .and_then(OneOrMany::first)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn birth_date(&self) -> Option<&str> {
        self.birth_date.as_deref().filter(|s| !s.is_empty())
    }

    fn is_complete(&self) -> bool {
        self.given().is_some() && self.family().is_some() && self.birth_date().is_some()
    }
}

/// Search-set entry wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry<R> {
    pub resource: Option<R>,
}

/// FHIR search result bundle, typed over the entry resource.
///
/// Only `total` decides completeness; every other field is read best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "R: DeserializeOwned"))]
pub struct SearchResult<R> {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub total: Option<u64>,

    /// Non-standard top-level date some EHR sandboxes attach to
    /// immunization searches; the misspelling is on the wire.
    #[serde(default, rename = "occurenceDateTime", deserialize_with = "lenient::opt")]
    pub occurence_date_time: Option<String>,

    #[serde(default = "Vec::new", deserialize_with = "entries")]
    pub entry: Vec<SearchEntry<R>>,
}

/// Entries keep their position; one that doesn't parse holds no resource.
/// A null or non-array `entry` reads as empty.
fn entries<'de, D, R>(deserializer: D) -> Result<Vec<SearchEntry<R>>, D::Error>
where
    D: Deserializer<'de>,
    R: DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    let JsonValue::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| SearchEntry {
            resource: item
                .get("resource")
                .cloned()
                .and_then(|r| serde_json::from_value(r).ok()),
        })
        .collect())
}

impl<R> SearchResult<R> {
    /// Match count; only meaningful once completeness has been checked
    pub fn total(&self) -> u64 {
        self.total.unwrap_or_default()
    }

    /// Resource of the first entry, if any
    pub fn first(&self) -> Option<&R> {
        self.entry.first().and_then(|e| e.resource.as_ref())
    }
}

/// Immunization resource (simplified)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImmunizationEntry {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub occurrence_date_time: Option<String>,
}

/// Resource metadata
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub last_updated: Option<String>,
}

/// Condition resource (simplified)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConditionEntry {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub onset_date_time: Option<String>,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub meta: Meta,
}

/// A resource that has passed its completeness check
#[derive(Debug, Clone)]
pub enum ClinicalResource {
    Patient(PatientResource),
    Immunizations(SearchResult<ImmunizationEntry>),
    Conditions(SearchResult<ConditionEntry>),
}

/// Shape a service expects to find under its prefetch key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Patient,
    ImmunizationSearch,
    ConditionSearch,
}

impl ResourceKind {
    /// Parse `value` and apply the completeness predicate for this kind.
    ///
    /// A Patient needs a given name, a family name and a birth date. A
    /// search result only needs `total`; a count of zero is data too.
    pub fn complete(self, value: &JsonValue) -> Option<ClinicalResource> {
        match self {
            ResourceKind::Patient => serde_json::from_value::<PatientResource>(value.clone())
                .ok()
                .filter(PatientResource::is_complete)
                .map(ClinicalResource::Patient),
            ResourceKind::ImmunizationSearch => {
                search_result(value).map(ClinicalResource::Immunizations)
            }
            ResourceKind::ConditionSearch => {
                search_result(value).map(ClinicalResource::Conditions)
            }
        }
    }
}

fn search_result<R>(value: &JsonValue) -> Option<SearchResult<R>>
where
    R: DeserializeOwned,
{
    serde_json::from_value::<SearchResult<R>>(value.clone())
        .ok()
        .filter(|s| s.total.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_with_dstu2_family_array_is_complete() {
        let value = json!({
            "name": [{"given": ["Ann"], "family": ["Lee"]}],
            "birthDate": "1990-01-01"
        });
        let Some(ClinicalResource::Patient(p)) = ResourceKind::Patient.complete(&value) else {
            panic!("expected complete patient");
        };
        assert_eq!(p.given(), Some("Ann"));
        assert_eq!(p.family(), Some("Lee"));
    }

    #[test]
    fn patient_with_r4_family_string_is_complete() {
        let value = json!({
            "resourceType": "Patient",
            "name": [{"given": ["Ann"], "family": "Lee"}],
            "birthDate": "1990-01-01"
        });
        assert!(ResourceKind::Patient.complete(&value).is_some());
    }

    #[test]
    fn patient_missing_birth_date_is_incomplete() {
        let value = json!({"name": [{"given": ["Ann"], "family": ["Lee"]}]});
        assert!(ResourceKind::Patient.complete(&value).is_none());
    }

    #[test]
    fn patient_with_empty_given_is_incomplete() {
        let value = json!({
            "name": [{"given": [""], "family": ["Lee"]}],
            "birthDate": "1990-01-01"
        });
        assert!(ResourceKind::Patient.complete(&value).is_none());
    }

    #[test]
    fn patient_without_names_is_incomplete() {
        let value = json!({"name": [], "birthDate": "1990-01-01"});
        assert!(ResourceKind::Patient.complete(&value).is_none());
    }

    #[test]
    fn search_result_with_zero_total_is_complete() {
        let value = json!({"total": 0});
        let Some(ClinicalResource::Immunizations(s)) =
            ResourceKind::ImmunizationSearch.complete(&value)
        else {
            panic!("expected complete search result");
        };
        assert_eq!(s.total(), 0);
        assert!(s.first().is_none());
    }

    #[test]
    fn search_result_without_total_is_incomplete() {
        let value = json!({"resourceType": "Bundle", "entry": []});
        assert!(ResourceKind::ConditionSearch.complete(&value).is_none());
    }

    #[test]
    fn search_result_with_null_entry_is_complete() {
        let value = json!({"total": 1, "entry": null});
        let Some(ClinicalResource::Conditions(s)) = ResourceKind::ConditionSearch.complete(&value)
        else {
            panic!("expected complete search result");
        };
        assert_eq!(s.total(), 1);
        assert!(s.first().is_none());
    }

    #[test]
    fn badly_typed_entry_fields_do_not_hide_total() {
        let value = json!({
            "total": 2,
            "entry": [
                {"resource": {"onsetDateTime": 20150402, "meta": null}},
                "not an entry"
            ]
        });
        let Some(ClinicalResource::Conditions(s)) = ResourceKind::ConditionSearch.complete(&value)
        else {
            panic!("expected complete search result");
        };
        assert_eq!(s.entry.len(), 2);
        let first = s.first().expect("first entry keeps its resource");
        assert_eq!(first.onset_date_time, None);
        assert_eq!(first.meta.last_updated, None);
        assert!(s.entry[1].resource.is_none());
    }

    #[test]
    fn non_numeric_total_is_incomplete() {
        let value = json!({"total": "many", "entry": []});
        assert!(ResourceKind::ImmunizationSearch.complete(&value).is_none());
    }

    #[test]
    fn condition_entry_fields_are_read() {
        let value = json!({
            "total": 1,
            "entry": [{"resource": {
                "onsetDateTime": "2015-04-02",
                "meta": {"lastUpdated": "2020-01-01T10:00:00Z"}
            }}]
        });
        let Some(ClinicalResource::Conditions(s)) = ResourceKind::ConditionSearch.complete(&value)
        else {
            panic!("expected complete search result");
        };
        let condition = s.first().expect("first entry");
        assert_eq!(condition.onset_date_time.as_deref(), Some("2015-04-02"));
        assert_eq!(condition.meta.last_updated.as_deref(), Some("2020-01-01T10:00:00Z"));
    }
}
