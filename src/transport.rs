//! HTTP transport: one POST per attempt, auth placement by provider.

use std::env;
use std::time::Duration;

use serde_json::Value;

use crate::config::{AuthMode, ProviderConfig};
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub(crate) struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let timeout_secs = env::var("CLASSIFY_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Transport)?;

        Ok(Self { client })
    }

    /// Sends one attempt. Transport failures are terminal; only the gateway's
    /// 429 handling ever re-enters here.
    pub async fn post(&self, config: &ProviderConfig, body: &Value) -> Result<reqwest::Response> {
        let mut req = self.client.post(config.endpoint.clone());

        req = match config.auth_mode {
            AuthMode::BearerHeader => req.bearer_auth(&config.credential),
            AuthMode::QueryKey => req.query(&[("key", config.credential.as_str())]),
        };

        req.json(body).send().await.map_err(Error::Transport)
    }
}
