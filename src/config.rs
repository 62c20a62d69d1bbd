use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Pramaan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming a JSON file with [`PipelineConfig`] overrides.
pub const CONFIG_ENV_VAR: &str = "PRAMAAN_CONFIG";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "pramaan=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pipeline config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the extraction-repair pipeline.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum rows a text-derived subject table needs before it replaces the model's table.
    pub min_subject_rows: usize,
    /// Marksheets reporting fewer subjects than this raise `insufficient_subjects`.
    pub min_reported_subjects: usize,
    /// Characters of the raw model response kept in a parse-failure envelope.
    pub raw_response_preview_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_subject_rows: 4,
            min_reported_subjects: 5,
            raw_response_preview_chars: 1000,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Load from the file named by `PRAMAAN_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                let config = Self::load(Path::new(&path))?;
                tracing::info!(path = ?path, "Loaded pipeline config");
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn app_name_is_pramaan() {
        assert_eq!(APP_NAME, "Pramaan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_subject_rows, 4);
        assert_eq!(config.min_reported_subjects, 5);
        assert_eq!(config.raw_response_preview_chars, 1000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"min_subject_rows": 6}"#).unwrap();
        assert_eq!(config.min_subject_rows, 6);
        assert_eq!(config.min_reported_subjects, 5);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = PipelineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"raw_response_preview_chars": 200}}"#).unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.raw_response_preview_chars, 200);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = PipelineConfig::load(Path::new("/nonexistent/pramaan.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/pramaan.json"));
    }

    #[test]
    fn default_filter_targets_crate() {
        assert!(default_log_filter().starts_with("pramaan"));
    }
}
