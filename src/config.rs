//! Provider configuration.
//!
//! A [`ProviderConfig`] is chosen once per call by the caller; the gateway
//! holds no provider state of its own.

use std::env;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

/// Default OpenAI chat completions endpoint.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// Default Gemini generateContent endpoint.
pub const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-2024-08-06";
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Which provider envelope to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderId {
    OpenAi,
    Gemini,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OPENAI_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" | "gpt-4o" => Ok(ProviderId::OpenAi),
            "gemini" | "gemini-pro" => Ok(ProviderId::Gemini),
            other => Err(Error::Validation(format!("unknown provider: {other}"))),
        }
    }
}

/// Where the credential is placed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer <credential>` header (OpenAI style).
    BearerHeader,
    /// `?key=<credential>` query parameter (Gemini style).
    QueryKey,
}

/// Everything the gateway needs to talk to one provider for one call.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    pub endpoint: Url,
    pub auth_mode: AuthMode,
    pub credential: String,
    pub model: String,
    pub max_tokens: u32,
    /// Retry budget for HTTP 429 responses; the initial attempt is not counted.
    pub max_retries: u32,
}

impl ProviderConfig {
    /// OpenAI defaults: bearer auth, `gpt-4o-2024-08-06`, 2000 max tokens.
    pub fn openai(credential: impl Into<String>) -> Self {
        Self {
            provider: ProviderId::OpenAi,
            endpoint: default_endpoint(OPENAI_ENDPOINT),
            auth_mode: AuthMode::BearerHeader,
            credential: credential.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Gemini defaults: query-parameter auth against the generateContent
    /// endpoint. The model is addressed through the endpoint path, so `model`
    /// is informational for this provider.
    pub fn gemini(credential: impl Into<String>) -> Self {
        Self {
            provider: ProviderId::Gemini,
            endpoint: default_endpoint(GEMINI_ENDPOINT),
            auth_mode: AuthMode::QueryKey,
            credential: credential.into(),
            model: "gemini-2.0-flash".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Builds a config for `provider` with the credential taken from its
    /// `*_API_KEY` environment variable.
    pub fn from_env(provider: ProviderId) -> Result<Self> {
        let var = provider.credential_env_var();
        let credential = env::var(var)
            .map_err(|_| Error::Validation(format!("missing credential: set {var}")))?;
        Ok(match provider {
            ProviderId::OpenAi => Self::openai(credential),
            ProviderId::Gemini => Self::gemini(credential),
        })
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

fn default_endpoint(literal: &str) -> Url {
    Url::parse(literal).expect("default endpoint literal is a valid URL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_parse() {
        assert!(Url::parse(OPENAI_ENDPOINT).is_ok());
        assert!(Url::parse(GEMINI_ENDPOINT).is_ok());
    }

    #[test]
    fn openai_defaults() {
        let cfg = ProviderConfig::openai("sk-test");
        assert_eq!(cfg.provider, ProviderId::OpenAi);
        assert_eq!(cfg.auth_mode, AuthMode::BearerHeader);
        assert_eq!(cfg.model, "gpt-4o-2024-08-06");
        assert_eq!(cfg.max_tokens, 2000);
        assert_eq!(cfg.max_retries, 3);
    }

    #[test]
    fn gemini_defaults() {
        let cfg = ProviderConfig::gemini("g-test");
        assert_eq!(cfg.auth_mode, AuthMode::QueryKey);
        assert!(cfg.endpoint.path().ends_with(":generateContent"));
    }

    #[test]
    fn provider_id_round_trip() {
        assert_eq!("openai".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!("Gemini".parse::<ProviderId>().unwrap(), ProviderId::Gemini);
        assert!("claude".parse::<ProviderId>().is_err());
    }
}
