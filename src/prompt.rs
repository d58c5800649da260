//! Prompt assembly: document enumeration and output-format instructions.
//!
//! Both providers receive the same logical text; OpenAI gets it as a
//! role-tagged message pair while Gemini gets one concatenated block with the
//! system instruction folded in.

use crate::types::ClassificationRequest;

/// Fixed system instruction used when the request carries no override.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert curator tasked with \
classifying documents into relevant categories. Analyze the provided text files and \
assign the most appropriate tags from the predefined list.";

/// The system instruction for a request.
pub(crate) fn system_instruction(request: &ClassificationRequest) -> &str {
    request
        .system_instruction
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
}

/// The user-facing task text: prompt, enumerated documents, and explicit
/// instructions naming the required JSON shape.
pub(crate) fn user_text(request: &ClassificationRequest) -> String {
    let mut text = String::new();
    text.push_str(&request.prompt_text);
    text.push_str("\n\n");

    for (index, doc) in request.documents.iter().enumerate() {
        text.push_str(&format!("Document {}: \"{}\"\n", index + 1, doc.name));
        text.push_str(&format!("Content: {}\n\n", doc.content));
    }

    text.push_str("For each document, provide the following:\n");
    text.push_str(&format!(
        "1. The most appropriate tag or tags from the provided list: {}\n",
        request.tag_vocabulary.join(", ")
    ));
    text.push_str("2. A brief explanation of why this tag is appropriate\n");
    text.push_str("3. Any key concepts or terms identified in the document\n\n");
    text.push_str(
        "Format your response as JSON with the following structure for each document:\n",
    );
    text.push_str(
        r#"{ "documentName": "name", "assignedTags": ["tag1", "tag2"], "explanation": "reason", "keyTerms": ["term1", "term2"] }"#,
    );

    text
}

/// Single concatenated block for providers without role separation.
pub(crate) fn concatenated_text(request: &ClassificationRequest) -> String {
    format!("{}\n\n{}", system_instruction(request), user_text(request))
}
