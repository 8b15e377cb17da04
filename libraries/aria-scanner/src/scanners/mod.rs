//! Per-file-kind scanners
//!
//! Each scanner owns one family of file extensions and the rows it produces.
//! The orchestrator asks `needs_scan` inside a read transaction and, only
//! when a scan is due, calls `scan_file` inside a per-file write transaction.

mod audio;
mod image;
mod lyrics;
mod playlist;

pub use audio::AudioFileScanner;
pub use image::ImageFileScanner;
pub use lyrics::LyricsFileScanner;
pub use playlist::PlaylistFileScanner;

use crate::error::Result;
use aria_core::MediaLibrary;
use async_trait::async_trait;
use sqlx::SqliteConnection;
use std::path::{Path, PathBuf};

/// Immutable facts shared by every file of one scan pass
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Library-wide scan version; rows stamped with an older version are
    /// re-evaluated even when the file itself is unchanged
    pub scan_version: i64,
    /// User-configured tag dimensions, handed to the metadata parser
    pub extra_tags: Vec<String>,
    pub media_library: MediaLibrary,
}

/// A discovered file, identified by path and modification time
#[derive(Debug, Clone)]
pub struct FileToScan {
    pub path: PathBuf,
    /// Unix seconds
    pub last_write: i64,
}

/// What a `scan_file` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Added,
    Updated,
    /// A previously indexed file turned unreadable; its row was deleted
    Removed,
    /// The file could not be indexed and no row exists for it
    Failed,
}

/// A scanner for one family of file extensions
#[async_trait]
pub trait FileScanner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lowercase extensions this scanner claims
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Whether the file changed since it was last indexed
    async fn needs_scan(
        &self,
        conn: &mut SqliteConnection,
        ctx: &ScanContext,
        file: &FileToScan,
    ) -> Result<bool>;

    /// Index one file; all writes happen on the supplied transaction
    /// connection, so a failure leaves no partial state behind
    async fn scan_file(
        &self,
        conn: &mut SqliteConnection,
        ctx: &ScanContext,
        file: &FileToScan,
    ) -> Result<ScanOutcome>;
}

pub(crate) fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn directory(path: &Path) -> String {
    path.parent().map(path_str).unwrap_or_default()
}
