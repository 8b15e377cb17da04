//! Image file scanner
//!
//! Indexes artwork by path. Files whose stem matches one of the usual cover
//! names are flagged so release artwork lookup can prefer them.

use crate::error::Result;
use crate::scanners::{directory, file_stem, path_str, FileScanner, FileToScan, ScanContext, ScanOutcome};
use aria_storage::images::{self, CreateImageFile};
use async_trait::async_trait;
use sqlx::SqliteConnection;

const EXTENSIONS: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png"];

const COVER_STEMS: &[&str] = &["albumart", "cover", "folder", "front"];

fn is_cover_stem(stem: &str) -> bool {
    COVER_STEMS.contains(&stem.to_lowercase().as_str())
}

#[derive(Default)]
pub struct ImageFileScanner;

impl ImageFileScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileScanner for ImageFileScanner {
    fn name(&self) -> &'static str {
        "image"
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
        let existing = images::get_by_path(conn, &path_str(&file.path)).await?;
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
        let existed = images::get_by_path(conn, &file_path).await?.is_some();
        let stem = file_stem(&file.path);
        let is_cover = is_cover_stem(&stem);

        images::upsert(
            conn,
            &CreateImageFile {
                file_path,
                file_last_write: file.last_write,
                scan_version: ctx.scan_version,
                file_stem: stem,
                directory: directory(&file.path),
                is_cover,
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
