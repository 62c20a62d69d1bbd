pub mod classify;
pub mod ocr;
pub mod processor; // Document processing orchestrator
pub mod structuring;
pub mod validation;
