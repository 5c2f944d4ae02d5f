//! Domain error types.

use crate::domain::schema::Column;

/// Top-level error type for crosstrader.
#[derive(Debug, thiserror::Error)]
pub enum CrosstraderError {
    #[error("missing column: {column}")]
    MissingColumn { column: Column },

    #[error("series is not strictly ascending at bar {index}")]
    UnorderedSeries { index: usize },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("data read error: {reason}")]
    DataRead { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report write error: {reason}")]
    ReportWrite { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrosstraderError {
    pub fn missing(column: Column) -> Self {
        CrosstraderError::MissingColumn { column }
    }
}

impl From<&CrosstraderError> for std::process::ExitCode {
    fn from(err: &CrosstraderError) -> Self {
        let code: u8 = match err {
            CrosstraderError::Io(_) | CrosstraderError::ReportWrite { .. } => 1,
            CrosstraderError::ConfigParse { .. }
            | CrosstraderError::ConfigMissing { .. }
            | CrosstraderError::ConfigInvalid { .. } => 2,
            CrosstraderError::DataRead { .. } => 3,
            CrosstraderError::MissingColumn { .. } | CrosstraderError::UnorderedSeries { .. } => 4,
            CrosstraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
