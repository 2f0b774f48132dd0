//! FHIR read and search requests, kept structured until the fetcher turns
//! them into a URL so that caller-supplied values are always escaped.

use std::fmt;

/// A relative FHIR request: path segments plus search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FhirQuery {
    pub path: Vec<String>,
    pub params: Vec<(String, String)>,
}

impl FhirQuery {
    /// `{resource_type}/{id}`
    pub fn read(resource_type: &str, id: &str) -> Self {
        Self {
            path: vec![resource_type.to_string(), id.to_string()],
            params: Vec::new(),
        }
    }

    /// `{resource_type}?...`
    pub fn search(resource_type: &str) -> Self {
        Self {
            path: vec![resource_type.to_string()],
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }
}

/// Unescaped form, as advertised in prefetch templates
impl fmt::Display for FhirQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join("/"))?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}
