//! CDS Hooks cards and the builders that render them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{ClinicalResource, PatientResource};

const TUTORIAL_LABEL: &str = "CDS Service Tutorial";
const FLU_FACTS_URL: &str = "https://www.cdc.gov/flu/prevent/keyfacts.htm";
const HYPERTENSION_FACTS_URL: &str = "https://www.cdc.gov/bloodpressure/facts.htm";

/// Card urgency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Info,
    Warning,
    Critical,
}

/// Where the card's content comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Link shown with a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,

    #[serde(rename = "type")]
    pub link_type: String,
}

impl Link {
    pub fn absolute(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            link_type: "absolute".to_string(),
        }
    }
}

/// Advisory message for the clinician
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub summary: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    pub indicator: Indicator,

    pub source: Source,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Response body of a service invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CardResponse {
    pub cards: Vec<Card>,
}

impl From<Vec<Card>> for CardResponse {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

/// Greeting card for a complete Patient
pub fn greeting_card(patient: &PatientResource) -> Card {
    let given = patient.given().unwrap_or_default();
    let family = patient.family().unwrap_or_default();
    Card {
        summary: format!("Now seeing: {} {}", given, family),
        detail: Some(format!("Birthdate: {}", patient.birth_date().unwrap_or_default())),
        indicator: Indicator::Info,
        source: Source {
            label: "Patient greeting service".to_string(),
            url: None,
        },
        links: Vec::new(),
    }
}

/// Builder for `patient-view-example`
pub fn patient_greeting(resource: &ClinicalResource) -> Vec<Card> {
    match resource {
        ClinicalResource::Patient(patient) => vec![greeting_card(patient)],
        _ => Vec::new(),
    }
}

/// Builder for `patient-hypertension-warning`.
///
/// No card when the patient has no hypertension condition on file.
pub fn hypertension_warning(resource: &ClinicalResource) -> Vec<Card> {
    let ClinicalResource::Conditions(conditions) = resource else {
        return Vec::new();
    };
    if conditions.total() == 0 {
        return Vec::new();
    }

    let first = conditions.first();
    let onset = first
        .and_then(|c| c.onset_date_time.as_deref())
        .unwrap_or("unknown");
    let updated = first
        .and_then(|c| c.meta.last_updated.as_deref())
        .map(display_timestamp)
        .unwrap_or_else(|| "unknown".to_string());

    vec![Card {
        summary: "Patient has hypertension on record".to_string(),
        detail: Some(format!(
            "Hypertension onset: {}. Record last updated: {}.",
            onset, updated
        )),
        indicator: Indicator::Warning,
        source: Source {
            label: TUTORIAL_LABEL.to_string(),
            url: None,
        },
        links: vec![Link::absolute("High Blood Pressure Facts", HYPERTENSION_FACTS_URL)],
    }]
}

/// Builder for `patient-vaccine-reminder`
pub fn flu_vaccine_reminder(resource: &ClinicalResource) -> Vec<Card> {
    let ClinicalResource::Immunizations(immunizations) = resource else {
        return Vec::new();
    };

    if immunizations.total() > 0 {
        let last = immunizations
            .occurence_date_time
            .as_deref()
            .or_else(|| {
                immunizations
                    .first()
                    .and_then(|i| i.occurrence_date_time.as_deref())
            })
            .unwrap_or("unknown date");
        return vec![Card {
            summary: "Flu vaccine up to date!".to_string(),
            detail: Some(format!("Last vaccine was on {}.", last)),
            indicator: Indicator::Info,
            source: Source {
                label: TUTORIAL_LABEL.to_string(),
                url: None,
            },
            links: Vec::new(),
        }];
    }

    vec![Card {
        summary: "Flu vaccine recommended!".to_string(),
        detail: Some("This patient currently has no flu vaccine on file.".to_string()),
        indicator: Indicator::Warning,
        source: Source {
            label: TUTORIAL_LABEL.to_string(),
            url: None,
        },
        links: vec![Link::absolute("Flu Vaccine Key Facts", FLU_FACTS_URL)],
    }]
}

/// RFC 3339 instants become `YYYY-MM-DD HH:MM UTC`; anything else is shown as-is.
fn display_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;
    use serde_json::json;

    fn complete(kind: ResourceKind, value: serde_json::Value) -> ClinicalResource {
        kind.complete(&value).expect("complete resource")
    }

    #[test]
    fn greeting_uses_first_given_and_family() {
        let patient = complete(
            ResourceKind::Patient,
            json!({
                "name": [
                    {"given": ["Ann", "Marie"], "family": ["Lee", "Park"]},
                    {"given": ["Other"], "family": ["Name"]}
                ],
                "birthDate": "1990-01-01"
            }),
        );
        let cards = patient_greeting(&patient);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].summary, "Now seeing: Ann Lee");
        assert_eq!(cards[0].detail.as_deref(), Some("Birthdate: 1990-01-01"));
        assert_eq!(cards[0].indicator, Indicator::Info);
    }

    #[test]
    fn greeting_serializes_to_cds_hooks_shape() {
        let patient = complete(
            ResourceKind::Patient,
            json!({"name": [{"given": ["Ann"], "family": ["Lee"]}], "birthDate": "1990-01-01"}),
        );
        let response = CardResponse::from(patient_greeting(&patient));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"cards": [{
                "summary": "Now seeing: Ann Lee",
                "detail": "Birthdate: 1990-01-01",
                "indicator": "info",
                "source": {"label": "Patient greeting service"}
            }]})
        );
    }

    #[test]
    fn no_flu_vaccine_yields_warning_with_cdc_link() {
        let immunizations = complete(ResourceKind::ImmunizationSearch, json!({"total": 0}));
        let cards = flu_vaccine_reminder(&immunizations);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].indicator, Indicator::Warning);
        assert!(cards[0].detail.as_deref().unwrap().contains("no flu vaccine on file"));
        assert_eq!(cards[0].links.len(), 1);
        assert_eq!(cards[0].links[0].url, FLU_FACTS_URL);

        let value = serde_json::to_value(&cards[0]).unwrap();
        assert_eq!(value["links"][0]["type"], "absolute");
    }

    #[test]
    fn flu_vaccine_on_file_yields_info() {
        let immunizations = complete(
            ResourceKind::ImmunizationSearch,
            json!({"total": 2, "occurenceDateTime": "2024-10-01"}),
        );
        let cards = flu_vaccine_reminder(&immunizations);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].indicator, Indicator::Info);
        assert_eq!(cards[0].detail.as_deref(), Some("Last vaccine was on 2024-10-01."));
        assert!(cards[0].links.is_empty());
    }

    #[test]
    fn flu_vaccine_date_falls_back_to_first_entry() {
        let immunizations = complete(
            ResourceKind::ImmunizationSearch,
            json!({
                "total": 1,
                "entry": [{"resource": {"occurrenceDateTime": "2023-09-15"}}]
            }),
        );
        let cards = flu_vaccine_reminder(&immunizations);
        assert_eq!(cards[0].detail.as_deref(), Some("Last vaccine was on 2023-09-15."));
    }

    #[test]
    fn hypertension_on_file_yields_warning() {
        let conditions = complete(
            ResourceKind::ConditionSearch,
            json!({
                "total": 1,
                "entry": [{"resource": {
                    "onsetDateTime": "2015-04-02",
                    "meta": {"lastUpdated": "2020-01-01T10:30:00+02:00"}
                }}]
            }),
        );
        let cards = hypertension_warning(&conditions);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].indicator, Indicator::Warning);
        assert_eq!(
            cards[0].detail.as_deref(),
            Some("Hypertension onset: 2015-04-02. Record last updated: 2020-01-01 08:30 UTC.")
        );
    }

    #[test]
    fn hypertension_with_unparsable_timestamp_shows_it_verbatim() {
        let conditions = complete(
            ResourceKind::ConditionSearch,
            json!({"total": 1, "entry": [{"resource": {"meta": {"lastUpdated": "2020-01"}}}]}),
        );
        let cards = hypertension_warning(&conditions);
        assert_eq!(
            cards[0].detail.as_deref(),
            Some("Hypertension onset: unknown. Record last updated: 2020-01.")
        );
    }

    #[test]
    fn no_hypertension_yields_no_cards() {
        let conditions = complete(ResourceKind::ConditionSearch, json!({"total": 0}));
        assert!(hypertension_warning(&conditions).is_empty());
    }

    #[test]
    fn builders_ignore_other_resource_kinds() {
        let immunizations = complete(ResourceKind::ImmunizationSearch, json!({"total": 0}));
        assert!(patient_greeting(&immunizations).is_empty());
        assert!(hypertension_warning(&immunizations).is_empty());
    }
}
