//! Tolerant extraction of classification records from raw model output.
//!
//! Model output is not contractually guaranteed: it may be a bare JSON array,
//! a single object, JSON wrapped in prose, or no JSON at all. [`parse`] never
//! fails. It finds the first balanced bracketed span with a scanner that
//! tracks nesting depth and string/escape state, parses that span strictly,
//! and returns the input verbatim whenever any step fails.

use serde_json::Value;

use crate::types::{ClassificationRecord, GatewayResult};

/// Parses raw model text into structured records, or returns it unchanged.
pub fn parse(raw_text: &str) -> GatewayResult {
    let Some(span) = first_balanced_span(raw_text) else {
        return GatewayResult::RawText(raw_text.to_string());
    };

    let value: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(_) => return GatewayResult::RawText(raw_text.to_string()),
    };

    // A single object is a one-element result set.
    let elements = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    GatewayResult::Structured(elements.iter().map(normalize_record).collect())
}

/// Reads one record out of an arbitrary JSON value, defaulting every field
/// the model left out or shaped differently.
fn normalize_record(value: &Value) -> ClassificationRecord {
    ClassificationRecord {
        document_name: string_field(value, "documentName"),
        assigned_tags: match value.get("assignedTags") {
            Some(Value::Array(tags)) => string_items(tags),
            // Models sometimes return a bare string for a single tag.
            Some(Value::String(tag)) => vec![tag.clone()],
            _ => Vec::new(),
        },
        explanation: string_field(value, "explanation"),
        key_terms: match value.get("keyTerms") {
            Some(Value::Array(terms)) => string_items(terms),
            _ => Vec::new(),
        },
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

/// First balanced top-level `[...]` or `{...}` span in `text`.
///
/// Tracks bracket depth and JSON string/escape state so brackets inside
/// string literals don't close the span. Returns `None` when no opener exists
/// or the span never closes.
fn first_balanced_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'[' || b == b'{')?;

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
