pub mod board;
pub mod doc_type;
pub mod script;

pub use board::detect_board;
pub use doc_type::{detect_document_type, is_income_certificate_text};
pub use script::{classify_script, ScriptVerdict};
