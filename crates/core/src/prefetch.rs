//! Prefetch validation

use serde_json::{Map, Value as JsonValue};

use crate::error::CdsError;
use crate::resource::{ClinicalResource, ResourceKind};

/// Look up `key` in the prefetch bundle and check it is a complete resource of `kind`.
pub fn validate(
    prefetch: Option<&Map<String, JsonValue>>,
    key: &str,
    kind: ResourceKind,
) -> Result<ClinicalResource, CdsError> {
    prefetch
        .and_then(|p| p.get(key))
        .filter(|v| !v.is_null())
        .and_then(|v| kind.complete(v))
        .ok_or_else(|| CdsError::InvalidPrefetch(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn absent_prefetch_is_invalid() {
        let err = validate(None, "patient", ResourceKind::Patient).unwrap_err();
        assert_eq!(err, CdsError::InvalidPrefetch("patient".into()));
    }

    #[test]
    fn absent_key_is_invalid() {
        let p = bundle(json!({"immunizations": {"total": 1}}));
        assert!(validate(Some(&p), "patient", ResourceKind::Patient).is_err());
    }

    #[test]
    fn null_entry_is_invalid() {
        let p = bundle(json!({"patient": null}));
        assert!(validate(Some(&p), "patient", ResourceKind::Patient).is_err());
    }

    #[test]
    fn patient_missing_birth_date_is_invalid() {
        let p = bundle(json!({"patient": {"name": [{"given": ["Ann"], "family": ["Lee"]}]}}));
        assert!(validate(Some(&p), "patient", ResourceKind::Patient).is_err());
    }

    #[test]
    fn zero_total_counts_as_data() {
        let p = bundle(json!({"immunizations": {"total": 0}}));
        let resource = validate(Some(&p), "immunizations", ResourceKind::ImmunizationSearch);
        assert!(matches!(resource, Ok(ClinicalResource::Immunizations(_))));
    }
}
