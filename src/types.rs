//! Core value objects: documents, classification requests, and results.
//!
//! Everything here is call-scoped and immutable once constructed; nothing is
//! shared across gateway invocations.

use serde::{Deserialize, Serialize};

/// A named piece of text supplied by the caller for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A logical classification request: prompt, documents, and the tag vocabulary
/// the model must choose from.
///
/// The gateway rejects dispatch when `tag_vocabulary` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub prompt_text: String,
    pub documents: Vec<Document>,
    pub tag_vocabulary: Vec<String>,
    /// Overrides the built-in system instruction when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

impl ClassificationRequest {
    pub fn new(
        prompt_text: impl Into<String>,
        documents: Vec<Document>,
        tag_vocabulary: Vec<String>,
    ) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            documents,
            tag_vocabulary,
            system_instruction: None,
        }
    }

    /// Builds a request with the standard classification prompt naming the
    /// tag vocabulary, for callers that don't need custom prompt text.
    pub fn with_default_prompt(documents: Vec<Document>, tag_vocabulary: Vec<String>) -> Self {
        let prompt_text = format!(
            "Please classify the following documents into the most appropriate categories from this list: {}.",
            tag_vocabulary.join(", ")
        );
        Self::new(prompt_text, documents, tag_vocabulary)
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// One classification verdict for one document, as recovered from model output.
///
/// Produced only by the result extractor; field names serialize in the wire
/// shape the prompt asks the model for (`documentName`, `assignedTags`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRecord {
    pub document_name: String,
    pub assigned_tags: Vec<String>,
    pub explanation: String,
    pub key_terms: Vec<String>,
}

/// Why a classification call terminated without usable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// HTTP 429 and the retry budget is exhausted.
    RateLimited,
    /// The provider reported an error in the response body.
    Provider,
    /// The success envelope was missing its expected fields.
    MalformedResponse,
    /// Network or connection failure; never retried.
    Transport,
    /// The request violated a pre-dispatch invariant.
    Validation,
    /// The caller aborted the call through its cancellation token.
    Cancelled,
}

/// Terminal outcome of a classify call. Exactly one variant is populated.
///
/// Callers must treat [`RawText`](GatewayResult::RawText) and
/// [`Failure`](GatewayResult::Failure) as distinct from
/// [`Structured`](GatewayResult::Structured): structured output is never
/// guaranteed, and raw text is still renderable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GatewayResult {
    /// Successfully parsed per-document classification records.
    Structured(Vec<ClassificationRecord>),
    /// Model output that could not be parsed into records, returned verbatim.
    RawText(String),
    /// The call failed before any model text was obtained.
    Failure { kind: FailureKind, message: String },
}

impl GatewayResult {
    pub fn is_structured(&self) -> bool {
        matches!(self, GatewayResult::Structured(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, GatewayResult::Failure { .. })
    }

    /// The recovered records, if this result is structured.
    pub fn records(&self) -> Option<&[ClassificationRecord]> {
        match self {
            GatewayResult::Structured(records) => Some(records),
            _ => None,
        }
    }
}
