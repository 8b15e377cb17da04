/// Metadata extraction errors
use thiserror::Error;

/// Errors produced while parsing a media file
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File does not exist or cannot be opened
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The container could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Parsed, but no usable audio stream or non-positive duration
    #[error("No audio stream: {0}")]
    NoAudioStream(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
