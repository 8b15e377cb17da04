//! Aria Metadata
//!
//! Normalized track record extraction from audio files.
//!
//! The scan pipeline consumes the [`MetadataParser`] trait and treats the
//! parser as a black box; [`LoftyParser`] is the production implementation.

#![forbid(unsafe_code)]

mod error;
mod parsed;
mod playlist;
mod reader;

pub use error::MetadataError;
pub use parsed::{ParsedArtist, ParsedPerformer, ParsedRelease, ParsedTrack};
pub use playlist::{parse_playlist, ParsedPlaylist};
pub use reader::LoftyParser;

use std::path::Path;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// A metadata extraction backend
///
/// `parse` either returns a complete normalized record or fails; a file
/// without a decodable audio stream or with a non-positive duration is a
/// failure, never a partial record. `extra_tags` names the user-configured
/// tag dimensions to extract on top of the fixed ones.
pub trait MetadataParser: Send + Sync {
    fn parse(&self, path: &Path, extra_tags: &[String]) -> Result<ParsedTrack>;
}
