use serde_json::Value;

use super::anomaly::AnomalyReport;
use super::{cbse, income, passbook, ssc};
use crate::config::PipelineConfig;
use crate::models::{BoardLabel, DocumentTypeLabel, ExtractedRecord, ExtractionMethod};
use crate::pipeline::classify::detect_board;
use crate::pipeline::structuring::{parse_model_response, ParseFailure};

/// A record after the validator chain, with its warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    pub record: ExtractedRecord,
    pub report: AnomalyReport,
    /// Issuing board, marksheets only.
    pub board: Option<BoardLabel>,
    /// How the subject table was obtained, SSC/CBSE marksheets only.
    pub extraction_method: Option<ExtractionMethod>,
}

impl ValidatedDocument {
    pub fn needs_manual_review(&self) -> bool {
        self.report.needs_manual_review()
    }

    /// Output JSON: the record plus `_extraction_method` and, when anomalies
    /// were raised, `_extraction_warnings` / `_needs_manual_review`.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        let mut value = self.record.to_json()?;
        if let Value::Object(map) = &mut value {
            if let Some(method) = self.extraction_method {
                map.insert(
                    "_extraction_method".to_string(),
                    Value::String(method.as_str().to_string()),
                );
            }
            self.report.attach(map);
        }
        Ok(value)
    }
}

/// Final result for one model response: a validated record or the parse
/// failure envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutput {
    Validated(ValidatedDocument),
    Failed(ParseFailure),
}

impl ExtractionOutput {
    pub fn document_type(&self) -> DocumentTypeLabel {
        match self {
            Self::Validated(doc) => doc.record.document_type(),
            Self::Failed(failure) => DocumentTypeLabel::from_hint(&failure.document_type),
        }
    }

    pub fn needs_manual_review(&self) -> bool {
        match self {
            Self::Validated(doc) => doc.needs_manual_review(),
            Self::Failed(_) => true,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        match self {
            Self::Validated(doc) => doc.to_json(),
            Self::Failed(failure) => serde_json::to_value(failure),
        }
    }
}

/// Route a parsed record to the validators for its document type.
///
/// Marksheets go to the SSC or CBSE validator by detected board; ICSE and
/// unknown boards pass through untouched. Document types without validators
/// are returned as parsed.
pub fn validate_record(
    mut record: ExtractedRecord,
    raw_text: &str,
    config: &PipelineConfig,
) -> ValidatedDocument {
    let mut report = AnomalyReport::new();
    let mut board = None;
    let mut extraction_method = None;

    match &mut record {
        ExtractedRecord::Marksheet(marksheet) => {
            let detected = detect_board(raw_text);
            board = Some(detected);
            extraction_method = match detected {
                BoardLabel::Ssc => Some(ssc::validate_ssc(marksheet, raw_text, config, &mut report)),
                BoardLabel::Cbse => {
                    Some(cbse::validate_cbse(marksheet, raw_text, config, &mut report))
                }
                BoardLabel::Icse | BoardLabel::Unknown => {
                    tracing::info!(board = %detected, "No validator for board, passing through");
                    None
                }
            };
        }
        ExtractedRecord::IncomeCertificate(certificate) => {
            income::validate_income_certificate(certificate, raw_text, &mut report);
        }
        ExtractedRecord::PassBook(book) => {
            passbook::validate_passbook(book, &mut report);
        }
        other => {
            tracing::debug!(document_type = %other.document_type(), "No validator, passing through");
        }
    }

    ValidatedDocument {
        record,
        report,
        board,
        extraction_method,
    }
}

/// Parse a model response and, when it yields a record, validate it.
pub fn extract_and_validate(
    response: &str,
    raw_text: &str,
    hint: DocumentTypeLabel,
    config: &PipelineConfig,
) -> ExtractionOutput {
    match parse_model_response(response, hint, config.raw_response_preview_chars) {
        Ok(record) => ExtractionOutput::Validated(validate_record(record, raw_text, config)),
        Err(failure) => ExtractionOutput::Failed(failure),
    }
}
