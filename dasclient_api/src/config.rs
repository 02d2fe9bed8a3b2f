use std::time::Duration;

use url::Url;

use crate::{DasError, DasResult};

pub const DEFAULT_CLIENT_ID: &str = "das_web_client";
pub const DEFAULT_PROVIDER_KEY: &str = "dasclient";

/// Connection settings for one DAS site. Credentials are supplied separately
/// through [`crate::Credentials`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DasConfig {
    pub service_root: String,
    pub token_url: String,
    pub provider_key: String,
    pub user_agent: String,
    pub request_timeout: Option<Duration>,
}

impl DasConfig {
    /// Settings for `https://<host>/api/v1.0` with its token endpoint at
    /// `https://<host>/oauth2/token`.
    pub fn for_host(host: &str) -> Self {
        let host = host.trim().trim_end_matches('/');
        Self {
            service_root: format!("https://{host}/api/v1.0"),
            token_url: format!("https://{host}/oauth2/token"),
            provider_key: DEFAULT_PROVIDER_KEY.to_owned(),
            user_agent: default_user_agent(),
            request_timeout: None,
        }
    }

    pub fn from_env() -> DasResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `DAS_HOST`, `DAS_SERVICE_ROOT`, `DAS_TOKEN_URL`,
    /// `DAS_PROVIDER_KEY`, `DAS_USER_AGENT` and `DAS_REQUEST_TIMEOUT_SECS`.
    /// The explicit URLs override the ones derived from the host.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DasResult<Self> {
        let service_root = lookup("DAS_SERVICE_ROOT");
        let token_url = lookup("DAS_TOKEN_URL");
        let mut config = match (lookup("DAS_HOST"), &service_root, &token_url) {
            (Some(host), _, _) => Self::for_host(&host),
            (None, Some(_), Some(_)) => Self::for_host(""),
            _ => {
                return Err(DasError::InvalidConfig(
                    "DAS_HOST or both DAS_SERVICE_ROOT and DAS_TOKEN_URL must be set",
                ));
            }
        };

        if let Some(service_root) = service_root {
            config.service_root = service_root;
        }
        if let Some(token_url) = token_url {
            config.token_url = token_url;
        }
        if let Some(provider_key) = lookup("DAS_PROVIDER_KEY") {
            config.provider_key = provider_key;
        }
        if let Some(user_agent) = lookup("DAS_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(raw) = lookup("DAS_REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                DasError::InvalidConfig("DAS_REQUEST_TIMEOUT_SECS must be a whole number of seconds")
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> DasResult<()> {
        if self.service_root.trim().is_empty() {
            return Err(DasError::InvalidConfig("service_root must be set"));
        }
        if self.token_url.trim().is_empty() {
            return Err(DasError::InvalidConfig("token_url must be set"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(DasError::InvalidConfig("user_agent must be set"));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(DasError::InvalidConfig("request_timeout must be positive"));
        }
        self.service_root_url()?;
        self.token_endpoint_url()?;
        Ok(())
    }

    pub fn service_root_url(&self) -> DasResult<Url> {
        Ok(Url::parse(self.service_root.trim())?)
    }

    pub fn token_endpoint_url(&self) -> DasResult<Url> {
        Ok(Url::parse(self.token_url.trim())?)
    }

    /// One HTTP client shared by the token endpoint and the API calls.
    pub fn http_client(&self) -> DasResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

fn default_user_agent() -> String {
    format!("das-client/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::DasConfig;
    use crate::DasError;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn for_host_derives_api_and_token_urls() {
        let config = DasConfig::for_host("demo.pamdas.org/");

        assert_eq!(config.service_root, "https://demo.pamdas.org/api/v1.0");
        assert_eq!(config.token_url, "https://demo.pamdas.org/oauth2/token");
        assert!(config.user_agent.starts_with("das-client/"));
        config.validate().expect("derived config is valid");
    }

    #[test]
    fn validate_rejects_empty_and_unparsable_values() {
        let mut config = DasConfig::for_host("demo.pamdas.org");
        config.user_agent = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(DasError::InvalidConfig("user_agent must be set"))
        ));

        let mut config = DasConfig::for_host("demo.pamdas.org");
        config.token_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(DasError::InvalidUrl(_))));

        let config = DasConfig::for_host("demo.pamdas.org").with_request_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn lookup_prefers_explicit_urls_over_host() {
        let config = DasConfig::from_lookup(lookup_from(&[
            ("DAS_HOST", "demo.pamdas.org"),
            ("DAS_TOKEN_URL", "https://auth.example.org/oauth2/token"),
            ("DAS_REQUEST_TIMEOUT_SECS", "15"),
        ]))
        .expect("config should load");

        assert_eq!(config.service_root, "https://demo.pamdas.org/api/v1.0");
        assert_eq!(config.token_url, "https://auth.example.org/oauth2/token");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn lookup_requires_host_or_both_urls() {
        let err = DasConfig::from_lookup(lookup_from(&[(
            "DAS_SERVICE_ROOT",
            "https://demo.pamdas.org/api/v1.0",
        )]))
        .expect_err("token url is missing");
        assert!(matches!(err, DasError::InvalidConfig(_)));

        let config = DasConfig::from_lookup(lookup_from(&[
            ("DAS_SERVICE_ROOT", "http://localhost:8000/api/v1.0"),
            ("DAS_TOKEN_URL", "http://localhost:8000/oauth2/token"),
        ]))
        .expect("both urls are enough");
        assert_eq!(config.service_root, "http://localhost:8000/api/v1.0");
    }

    #[test]
    fn lookup_rejects_non_numeric_timeout() {
        let err = DasConfig::from_lookup(lookup_from(&[
            ("DAS_HOST", "demo.pamdas.org"),
            ("DAS_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .expect_err("timeout must be numeric");
        assert!(matches!(err, DasError::InvalidConfig(_)));
    }
}
