//! Configuration module
//!
//! Connection settings for the ETL API. Every flag falls back to its
//! `VENA_*` environment variable.

use anyhow::{Context, Result};
use clap::Args;
use vepi_client::{ClientConfig, EtlClient};

/// Connection flags shared by every command
#[derive(Clone, Args)]
pub struct ConnectionArgs {
    /// Data center hub (e.g. us1, us2, ca3)
    #[arg(long, env = "VENA_HUB")]
    pub hub: String,

    /// API user from the authentication token
    #[arg(long, env = "VENA_API_USER")]
    pub api_user: String,

    /// API key from the authentication token
    #[arg(long, env = "VENA_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// ETL template that jobs are created from
    #[arg(long, env = "VENA_TEMPLATE_ID")]
    pub template_id: String,

    /// Model queried by export and hierarchy
    #[arg(long, env = "VENA_MODEL_ID")]
    pub model_id: Option<String>,

    /// Override the API root (default: https://{hub}.vena.io/api/public/v1)
    #[arg(long, env = "VENA_BASE_URL")]
    pub base_url: Option<String>,
}

impl ConnectionArgs {
    /// Build the client configuration from the parsed flags
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(
            &self.hub,
            &self.api_user,
            &self.api_key,
            &self.template_id,
        );

        if let Some(model_id) = &self.model_id {
            config = config.with_model_id(model_id);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }

        config
    }

    /// Build a validated ETL client
    pub fn connect(&self) -> Result<EtlClient> {
        EtlClient::new(self.client_config()).context("Invalid connection settings")
    }
}
