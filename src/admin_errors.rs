use thiserror::Error;

use crate::constants::Degree;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid configuration URI: {0}")]
    InvalidConfigUri(String),

    #[error("Unsupported type of APDB configuration: {0}")]
    UnsupportedApdbConfig(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed snapshot file: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Snapshot is missing expected data: {0}")]
    SnapshotFormat(String),

    #[error("Time conversion error: {0}")]
    TimeError(#[from] hifitime::HifitimeError),

    #[error("Coordinates do not map to a unit direction: ra={ra} dec={dec}")]
    InvalidCoordinates { ra: Degree, dec: Degree },

    #[error("Record deletion failed: {0}")]
    DeleteFailed(String),

    #[error("Catalog fetch failed: {0}")]
    FetchFailed(String),
}
