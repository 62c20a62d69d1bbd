use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("OCR processing failed: {0}")]
    Processing(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

/// Text recognised from one document image or PDF.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OcrOutput {
    pub text: String,
    /// Best-effort document type label from the engine, e.g. "income_certificate".
    pub doc_type_hint: Option<String>,
    pub success: bool,
}

impl OcrOutput {
    pub fn recognised(text: &str) -> Self {
        Self {
            text: text.to_string(),
            doc_type_hint: None,
            success: true,
        }
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.doc_type_hint = Some(hint.to_string());
        self
    }
}

/// OCR engine abstraction (allows mocking for tests).
///
/// `primary` is the general-purpose engine tuned for English print;
/// `alternate` handles Devanagari text and scans the primary engine garbles.
pub trait OcrEngine {
    fn primary(&self, document: &[u8]) -> Result<OcrOutput, OcrError>;

    fn alternate(&self, document: &[u8]) -> Result<OcrOutput, OcrError>;
}

/// Mock OCR engine for testing: fixed output per channel.
pub struct MockOcrEngine {
    pub primary: OcrOutput,
    pub alternate: OcrOutput,
}

impl MockOcrEngine {
    pub fn new(primary: OcrOutput, alternate: OcrOutput) -> Self {
        Self { primary, alternate }
    }

    /// Both channels return the same text.
    pub fn with_text(text: &str) -> Self {
        Self::new(OcrOutput::recognised(text), OcrOutput::recognised(text))
    }
}

impl OcrEngine for MockOcrEngine {
    fn primary(&self, _document: &[u8]) -> Result<OcrOutput, OcrError> {
        Ok(self.primary.clone())
    }

    fn alternate(&self, _document: &[u8]) -> Result<OcrOutput, OcrError> {
        Ok(self.alternate.clone())
    }
}
