//! Client configuration
//!
//! Connection settings fixed at client construction: the data center hub,
//! the API credential pair, the ETL template that jobs run, and the model
//! that exports read from.

use std::fmt;

use crate::error::{EtlError, Result};

/// Connection configuration for the ETL API
///
/// Immutable once handed to [`crate::EtlClient`]; every request uses the same
/// credentials and template.
#[derive(Clone)]
pub struct ClientConfig {
    /// Data center hub (e.g., "us1", "us2", "ca3")
    pub hub: String,

    /// API user from the authentication token
    pub api_user: String,

    /// API key from the authentication token
    pub api_key: String,

    /// ETL template that jobs are created from
    pub template_id: String,

    /// Model queried by exports and hierarchy lookups
    pub model_id: Option<String>,

    /// API root; defaults to the public endpoint of `hub`
    pub base_url: String,
}

impl ClientConfig {
    /// Creates a new configuration pointing at the public API of `hub`
    pub fn new(
        hub: impl Into<String>,
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        template_id: impl Into<String>,
    ) -> Self {
        let hub = hub.into();
        let base_url = public_base_url(&hub);
        Self {
            hub,
            api_user: api_user.into(),
            api_key: api_key.into(),
            template_id: template_id.into(),
            model_id: None,
            base_url,
        }
    }

    /// Sets the model used by export operations
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Overrides the API root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - VENA_HUB (required)
    /// - VENA_API_USER (required)
    /// - VENA_API_KEY (required)
    /// - VENA_TEMPLATE_ID (required)
    /// - VENA_MODEL_ID (optional)
    /// - VENA_BASE_URL (optional, default: https://{hub}.vena.io/api/public/v1)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            required_env("VENA_HUB")?,
            required_env("VENA_API_USER")?,
            required_env("VENA_API_KEY")?,
            required_env("VENA_TEMPLATE_ID")?,
        );

        if let Some(model_id) = optional_env("VENA_MODEL_ID") {
            config = config.with_model_id(model_id);
        }

        if let Some(base_url) = optional_env("VENA_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("hub", &self.hub),
            ("api_user", &self.api_user),
            ("api_key", &self.api_key),
            ("template_id", &self.template_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(EtlError::Validation(format!("{name} cannot be empty")));
            }
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(EtlError::Validation(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured model, or a validation error naming `operation`
    pub(crate) fn require_model(&self, operation: &str) -> Result<&str> {
        self.model_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| EtlError::Validation(format!("Model ID must be set to {operation}")))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hub", &self.hub)
            .field("api_user", &self.api_user)
            .field("api_key", &"<redacted>")
            .field("template_id", &self.template_id)
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Public API root for a hub
pub fn public_base_url(hub: &str) -> String {
    format!("https://{hub}.vena.io/api/public/v1")
}

fn required_env(name: &str) -> Result<String> {
    optional_env(name)
        .ok_or_else(|| EtlError::Validation(format!("{name} environment variable not set")))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("us1", "user", "secret", "tmpl-1")
    }

    #[test]
    fn test_default_base_url() {
        let config = config();
        assert_eq!(config.base_url, "https://us1.vena.io/api/public/v1");
        assert!(config.model_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();

        config.api_key = String::new();
        assert!(config.validate().unwrap_err().is_validation());

        config.api_key = "secret".to_string();
        config = config.with_base_url("not-a-url");
        assert!(config.validate().is_err());

        config = config.with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_require_model() {
        let config = config();
        let err = config.require_model("export data").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Model ID must be set to export data");

        let config = config.with_model_id("m-1");
        assert_eq!(config.require_model("export data").unwrap(), "m-1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", config());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
    }
}
