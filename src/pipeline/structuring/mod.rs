pub mod parser;
pub mod schema;
pub mod types;

pub use parser::*;
pub use schema::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Language model unavailable: {0}")]
    LlmUnavailable(String),

    #[error("JSON parsing failed")]
    JsonParsing(#[source] serde_json::Error),

    #[error("No JSON object or array found in response")]
    NoJsonFound,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
