use std::path::PathBuf;

use crate::models::{GoldType, UnknownGoldType};

#[derive(Debug, thiserror::Error)]
pub enum GoldError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not decode response body (tried {})", tried.join(", "))]
    Encoding { tried: Vec<&'static str> },

    #[error("I/O error on {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xlsx")]
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("no records parsed for {0}")]
    NoRecords(GoldType),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl GoldError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GoldError::Persistence {
            path: path.into(),
            source,
        }
    }
}

impl From<UnknownGoldType> for GoldError {
    fn from(e: UnknownGoldType) -> Self {
        GoldError::InvalidArgument(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GoldError>;
