use std::sync::Mutex;

use super::StructuringError;
use crate::models::DocumentTypeLabel;

/// Language-model abstraction. Prompt wording lives with the implementation;
/// the pipeline only supplies the document type and its ordered field names.
pub trait LlmClient {
    fn complete(
        &self,
        raw_text: &str,
        document_type: DocumentTypeLabel,
        fields: &[&str],
    ) -> Result<String, StructuringError>;
}

/// Mock LLM client for testing: returns a configurable response and
/// remembers the document type of the last request.
pub struct MockLlmClient {
    response: Result<String, String>,
    last_document_type: Mutex<Option<DocumentTypeLabel>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            last_document_type: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            last_document_type: Mutex::new(None),
        }
    }

    pub fn last_document_type(&self) -> Option<DocumentTypeLabel> {
        self.last_document_type.lock().ok().and_then(|guard| *guard)
    }
}

impl LlmClient for MockLlmClient {
    fn complete(
        &self,
        _raw_text: &str,
        document_type: DocumentTypeLabel,
        _fields: &[&str],
    ) -> Result<String, StructuringError> {
        if let Ok(mut guard) = self.last_document_type.lock() {
            *guard = Some(document_type);
        }
        self.response
            .clone()
            .map_err(StructuringError::LlmUnavailable)
    }
}
