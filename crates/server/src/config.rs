//! Server configuration

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub cors_origins: Vec<String>,
    /// Token CDS clients must present; `None` rejects every invocation
    /// unless `allow_anonymous` is set.
    pub bearer_token: Option<String>,
    pub allow_anonymous: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["*".to_string()]),
            bearer_token: std::env::var("CDS_BEARER_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            allow_anonymous: std::env::var("CDS_ALLOW_ANONYMOUS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            cors_origins: vec!["*".to_string()],
            bearer_token: None,
            allow_anonymous: false,
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_list_is_trimmed() {
        assert_eq!(
            parse_list("https://ehr.example.org, http://localhost:8080,,"),
            vec!["https://ehr.example.org", "http://localhost:8080"]
        );
    }

    #[test]
    fn anonymous_access_needs_an_explicit_yes() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" ON "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
        assert!(!Config::default().allow_anonymous);
    }
}
