//! Lyrics file scanner
//!
//! Indexes sidecar lyrics files by path; association to a track happens in
//! post-scan maintenance once both sides are indexed.

use crate::error::Result;
use crate::scanners::{directory, file_stem, path_str, FileScanner, FileToScan, ScanContext, ScanOutcome};
use aria_storage::lyrics::{self, CreateLyricsFile};
use async_trait::async_trait;
use sqlx::SqliteConnection;

const EXTENSIONS: &[&str] = &["lrc", "txt"];

#[derive(Default)]
pub struct LyricsFileScanner;

impl LyricsFileScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileScanner for LyricsFileScanner {
    fn name(&self) -> &'static str {
        "lyrics"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        EXTENSIONS
    }

    async fn needs_scan(
        &self,
        conn: &mut SqliteConnection,
        ctx: &ScanContext,
        file: &FileToScan,
    ) -> Result<bool> {
        let existing = lyrics::get_by_path(conn, &path_str(&file.path)).await?;
        Ok(match existing {
            Some(row) => {
                row.file_last_write != file.last_write || row.scan_version < ctx.scan_version
            }
            None => true,
        })
    }

    async fn scan_file(
        &self,
        conn: &mut SqliteConnection,
        ctx: &ScanContext,
        file: &FileToScan,
    ) -> Result<ScanOutcome> {
        let file_path = path_str(&file.path);
        let existed = lyrics::get_by_path(conn, &file_path).await?.is_some();

        lyrics::upsert(
            conn,
            &CreateLyricsFile {
                file_path,
                file_last_write: file.last_write,
                scan_version: ctx.scan_version,
                file_stem: file_stem(&file.path),
                directory: directory(&file.path),
            },
        )
        .await?;

        Ok(if existed {
            ScanOutcome::Updated
        } else {
            ScanOutcome::Added
        })
    }
}
