//! Field validators that cross-check model output against the OCR text.

pub mod anomaly;
pub mod cbse;
pub mod dispatch;
pub mod income;
pub mod passbook;
pub mod ssc;
pub mod verify;

pub use anomaly::{AnomalyReport, ValidationWarning};
pub use dispatch::{extract_and_validate, validate_record, ExtractionOutput, ValidatedDocument};
