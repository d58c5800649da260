//! Provider driver abstraction layer.
//!
//! Each provider envelope (OpenAI chat completions, Gemini generateContent)
//! has a concrete driver that builds the wire body and unwraps the success
//! envelope. Drivers are object-safe; the gateway selects one at call time
//! via [`for_provider`].

pub mod gemini;

use serde_json::Value;

use crate::config::{ProviderConfig, ProviderId};
use crate::error::{Error, Result};
use crate::prompt;
use crate::types::ClassificationRequest;

pub use gemini::GeminiDriver;

/// Provider-specific request building and response unwrapping.
pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    fn provider_id(&self) -> ProviderId;

    /// Serialized JSON body for one classification call.
    fn build_request(&self, request: &ClassificationRequest, config: &ProviderConfig) -> Value;

    /// Extracts the textual payload from a success envelope.
    ///
    /// Missing expected fields are a [`Error::MalformedResponse`]; provider
    /// `error` bodies are classified by the gateway before this is called.
    fn extract_content(&self, body: &Value) -> Result<String>;
}

/// OpenAI chat completions driver: role-tagged message array with a fixed
/// system instruction, response in `choices[0].message.content`.
#[derive(Debug, Default)]
pub struct OpenAiDriver;

impl ProviderDriver for OpenAiDriver {
    fn provider_id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn build_request(&self, request: &ClassificationRequest, config: &ProviderConfig) -> Value {
        serde_json::json!({
            "model": config.model,
            "messages": [
                { "role": "system", "content": prompt::system_instruction(request) },
                { "role": "user", "content": prompt::user_text(request) },
            ],
            "max_tokens": config.max_tokens,
        })
    }

    fn extract_content(&self, body: &Value) -> Result<String> {
        body.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| {
                Error::MalformedResponse(
                    "missing choices[0].message.content in OpenAI response".into(),
                )
            })
    }
}

/// Selects the driver for a provider.
pub fn for_provider(provider: ProviderId) -> Box<dyn ProviderDriver> {
    match provider {
        ProviderId::OpenAi => Box::new(OpenAiDriver),
        ProviderId::Gemini => Box::new(GeminiDriver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;

    fn request() -> ClassificationRequest {
        ClassificationRequest::new(
            "Classify.",
            vec![Document::new("notes.txt", "heuristic evaluation notes")],
            vec!["Usability".into()],
        )
    }

    #[test]
    fn openai_body_shape() {
        let cfg = ProviderConfig::openai("sk-test");
        let body = OpenAiDriver.build_request(&request(), &cfg);
        assert_eq!(body["model"], "gpt-4o-2024-08-06");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("notes.txt"));
        assert!(user.contains("assignedTags"));
    }

    #[test]
    fn openai_extracts_first_choice() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "[]" }, "finish_reason": "stop" }]
        });
        assert_eq!(OpenAiDriver.extract_content(&body).unwrap(), "[]");
    }

    #[test]
    fn openai_missing_choices_is_malformed() {
        let body = serde_json::json!({ "id": "chatcmpl-1" });
        let err = OpenAiDriver.extract_content(&body).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn factory_matches_provider() {
        assert_eq!(
            for_provider(ProviderId::Gemini).provider_id(),
            ProviderId::Gemini
        );
    }
}
