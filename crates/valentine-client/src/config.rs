use url::Url;

use crate::error::ConfigError;

const DEFAULT_STORE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Where the client finds the Record Store and which origin share links point at.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub store_url: Url,
    pub site_url: Url,
}

impl ClientConfig {
    /// Reads `VALENTINE_STORE_URL` and `VALENTINE_SITE_URL`, falling back to
    /// local development defaults. Callers load `.env` beforehand if they want it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &'static str, default: &str| {
            let raw = lookup(var).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { var, source })
        };

        Ok(Self {
            store_url: read("VALENTINE_STORE_URL", DEFAULT_STORE_URL)?,
            site_url: read("VALENTINE_SITE_URL", DEFAULT_SITE_URL)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.store_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.site_url.as_str(), "http://localhost:5173/");
    }

    #[test]
    fn bad_url_names_the_variable() {
        let err = ClientConfig::from_lookup(|key| {
            (key == "VALENTINE_SITE_URL").then(|| "not a url".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("VALENTINE_SITE_URL"));
    }
}
