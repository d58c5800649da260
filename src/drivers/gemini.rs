//! Google Gemini generateContent driver. Key differences from OpenAI:
//! - Request uses `contents` with `parts`, no role separation; the system
//!   instruction is folded into one concatenated text block.
//! - Response text lives at `candidates[0].content.parts[0].text`.
//! - The API key travels as a `?key=` query parameter, not in headers.

use serde_json::Value;

use crate::config::{ProviderConfig, ProviderId};
use crate::error::{Error, Result};
use crate::prompt;
use crate::types::ClassificationRequest;

use super::ProviderDriver;

#[derive(Debug, Default)]
pub struct GeminiDriver;

impl ProviderDriver for GeminiDriver {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn build_request(&self, request: &ClassificationRequest, _config: &ProviderConfig) -> Value {
        serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt::concatenated_text(request) } ] }
            ]
        })
    }

    fn extract_content(&self, body: &Value) -> Result<String> {
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| {
                Error::MalformedResponse(
                    "missing candidates[0].content.parts[0].text in Gemini response".into(),
                )
            })
    }
}
