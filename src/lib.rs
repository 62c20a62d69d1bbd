pub mod config;
pub mod models;
pub mod pipeline;

pub use config::PipelineConfig;
pub use models::{BoardLabel, DocumentTypeLabel, ExtractedRecord, SubjectRow};
pub use pipeline::ocr::{OcrEngine, OcrOutput};
pub use pipeline::processor::{DocumentProcessor, PipelineError, ProcessingOutcome};
pub use pipeline::structuring::{parse_model_response, LlmClient, ParseFailure};
pub use pipeline::validation::{
    extract_and_validate, validate_record, AnomalyReport, ExtractionOutput, ValidatedDocument,
};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise [`config::default_log_filter`] applies.
/// Calling it twice is harmless: the second install is ignored.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
