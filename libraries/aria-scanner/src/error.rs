//! Scanner errors

use thiserror::Error;

/// Errors produced by the scan pipeline
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Storage(#[from] aria_storage::StorageError),

    #[error(transparent)]
    Metadata(#[from] aria_metadata::MetadataError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using `ScanError`
pub type Result<T> = std::result::Result<T, ScanError>;
