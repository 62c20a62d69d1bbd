use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::schema_fields;
use super::StructuringError;
use crate::models::{DocumentTypeLabel, ExtractedRecord};

/// Terminal envelope returned in place of a record when the model response is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub error: String,
    pub document_type: String,
    pub raw_response: String,
}

/// Recover a typed record from the model's raw completion text.
///
/// Tolerates code fences and prose around the JSON, and array-shaped answers
/// (mapped onto the schema of `hint` by position). A missing or unrecognised
/// `document_type` is backfilled from `hint`. Failures never propagate as
/// errors: they become a [`ParseFailure`] carrying the first `preview_chars`
/// characters of the response.
pub fn parse_model_response(
    response: &str,
    hint: DocumentTypeLabel,
    preview_chars: usize,
) -> Result<ExtractedRecord, ParseFailure> {
    parse_record(response, hint).map_err(|e| {
        tracing::warn!(
            document_type = %hint,
            error = %e,
            response_chars = response.chars().count(),
            "Model response could not be parsed"
        );
        ParseFailure {
            error: e.to_string(),
            document_type: hint.as_str().to_string(),
            raw_response: response.chars().take(preview_chars).collect(),
        }
    })
}

fn parse_record(response: &str, hint: DocumentTypeLabel) -> Result<ExtractedRecord, StructuringError> {
    let cleaned = strip_code_fences(response);

    let fields = if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        serde_json::from_str::<Map<String, Value>>(json_slice(cleaned, start, end))
            .map_err(StructuringError::JsonParsing)?
    } else if let (Some(start), Some(end)) = (cleaned.find('['), cleaned.rfind(']')) {
        let items = serde_json::from_str::<Vec<Value>>(json_slice(cleaned, start, end))
            .map_err(StructuringError::JsonParsing)?;
        tracing::debug!(
            document_type = %hint,
            items = items.len(),
            "Model returned an array, mapping onto schema fields"
        );
        map_array_to_schema(items, hint)
    } else {
        return Err(StructuringError::NoJsonFound);
    };

    let label = resolve_document_type(&fields, hint);
    ExtractedRecord::from_object(label, fields)
        .map_err(|e| StructuringError::ResponseParsing(e.to_string()))
}

/// Strip a leading ```` ```json ```` / ```` ``` ```` and a trailing ```` ``` ````.
fn strip_code_fences(response: &str) -> &str {
    let mut cleaned = response.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Inclusive slice between the delimiters; an inverted pair yields "" (a JSON error).
fn json_slice(text: &str, start: usize, end: usize) -> &str {
    text.get(start..=end).unwrap_or("")
}

fn map_array_to_schema(items: Vec<Value>, hint: DocumentTypeLabel) -> Map<String, Value> {
    let mut items = items.into_iter();
    schema_fields(hint)
        .iter()
        .map(|field| (field.to_string(), items.next().unwrap_or(Value::Null)))
        .collect()
}

fn resolve_document_type(fields: &Map<String, Value>, hint: DocumentTypeLabel) -> DocumentTypeLabel {
    match fields.get("document_type").and_then(Value::as_str) {
        Some(declared) => DocumentTypeLabel::parse_loose(declared).unwrap_or_else(|| {
            tracing::debug!(declared, fallback = %hint, "Unrecognised document_type from model");
            hint
        }),
        None => hint,
    }
}
