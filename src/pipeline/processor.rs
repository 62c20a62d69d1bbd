//! Document processing orchestrator.
//!
//! Single entry point that drives one request through the pipeline:
//! primary OCR → script check → (alternate OCR) → model → parse → validate.
//!
//! Uses trait-based DI for the OCR engine and the language model so the
//! orchestrator remains fully testable with mock implementations.

use uuid::Uuid;

use crate::config::{ConfigError, PipelineConfig};
use crate::models::{DocumentTypeLabel, OcrChannel};
use crate::pipeline::classify::{classify_script, detect_document_type, is_income_certificate_text};
use crate::pipeline::ocr::{OcrEngine, OcrError, OcrOutput};
use crate::pipeline::structuring::{schema_fields, LlmClient, StructuringError};
use crate::pipeline::validation::{extract_and_validate, ExtractionOutput};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort processing of a document.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("OCR failed on the {0} channel")]
    OcrFailed(OcrChannel),

    #[error("OCR engine error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Language model failed: {0}")]
    Llm(#[from] StructuringError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOutcome {
    pub request_id: Uuid,
    /// OCR channel whose text was used downstream.
    pub channel: OcrChannel,
    /// Type hint handed to the model.
    pub document_type: DocumentTypeLabel,
    pub output: ExtractionOutput,
}

impl ProcessingOutcome {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        self.output.to_json()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct DocumentProcessor {
    ocr: Box<dyn OcrEngine + Send + Sync>,
    llm: Box<dyn LlmClient + Send + Sync>,
    config: PipelineConfig,
}

impl DocumentProcessor {
    pub fn new(
        ocr: Box<dyn OcrEngine + Send + Sync>,
        llm: Box<dyn LlmClient + Send + Sync>,
        config: PipelineConfig,
    ) -> Self {
        Self { ocr, llm, config }
    }

    /// Build with the config named by `PRAMAAN_CONFIG` (defaults when unset).
    pub fn from_env(
        ocr: Box<dyn OcrEngine + Send + Sync>,
        llm: Box<dyn LlmClient + Send + Sync>,
    ) -> Result<Self, PipelineError> {
        Ok(Self::new(ocr, llm, PipelineConfig::from_env()?))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Full pipeline for one document.
    ///
    /// 1. Primary OCR
    /// 2. Script check; re-read with the alternate engine when the text is
    ///    Devanagari or gibberish (never for marksheets)
    /// 3. Resolve the document type hint
    /// 4. Ask the model for the fields of that type
    /// 5. Parse the response and run the validators
    ///
    /// A model response that cannot be parsed is not an error: it comes back
    /// as [`ExtractionOutput::Failed`].
    pub fn process(&self, document: &[u8]) -> Result<ProcessingOutcome, PipelineError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("process_document", request_id = %request_id);
        let _guard = span.enter();

        // Step 1: Primary OCR
        let primary = self.ocr.primary(document)?;
        if !primary.success {
            tracing::warn!("Primary OCR reported failure");
            return Err(PipelineError::OcrFailed(OcrChannel::Primary));
        }

        // Step 2: Script check
        let verdict = classify_script(&primary.text);
        let (channel, ocr) = if verdict.needs_alternate_ocr {
            tracing::info!(rule = verdict.rule, "Switching to alternate OCR");
            let alternate = self.ocr.alternate(document)?;
            if !alternate.success {
                tracing::warn!("Alternate OCR reported failure");
                return Err(PipelineError::OcrFailed(OcrChannel::Alternate));
            }
            (OcrChannel::Alternate, alternate)
        } else {
            (OcrChannel::Primary, primary)
        };

        // Step 3: Type hint
        let document_type = resolve_document_type(&ocr, channel, verdict.is_marksheet);

        // Step 4: Model
        tracing::info!(
            channel = %channel,
            document_type = %document_type,
            text_chars = ocr.text.chars().count(),
            "Processing: requesting structured extraction"
        );
        let response = self
            .llm
            .complete(&ocr.text, document_type, schema_fields(document_type))?;

        // Step 5: Parse + validate
        let output = extract_and_validate(&response, &ocr.text, document_type, &self.config);

        tracing::info!(
            document_type = %output.document_type(),
            needs_review = output.needs_manual_review(),
            parsed = matches!(output, ExtractionOutput::Validated(_)),
            "Processing complete"
        );

        Ok(ProcessingOutcome {
            request_id,
            channel,
            document_type,
            output,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Engine hint first, then the income-certificate score for alternate-channel
/// text, then keyword detection. Marksheet vocabulary decides an unknown type.
fn resolve_document_type(ocr: &OcrOutput, channel: OcrChannel, is_marksheet: bool) -> DocumentTypeLabel {
    if let Some(label) = ocr
        .doc_type_hint
        .as_deref()
        .and_then(DocumentTypeLabel::parse_loose)
        .filter(|l| *l != DocumentTypeLabel::Unknown)
    {
        return label;
    }

    if channel == OcrChannel::Alternate && is_income_certificate_text(&ocr.text) {
        return DocumentTypeLabel::IncomeCertificate;
    }

    match detect_document_type(&ocr.text) {
        DocumentTypeLabel::Unknown if is_marksheet => DocumentTypeLabel::Marksheet,
        label => label,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
