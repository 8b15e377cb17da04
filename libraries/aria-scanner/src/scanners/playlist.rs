//! Playlist file scanner
//!
//! Indexes `.m3u`/`.m3u8` files with their entry paths; resolving entries to
//! tracks happens in post-scan maintenance, since the referenced files may
//! be scanned after the playlist. A playlist that was indexed before but can
//! no longer be read loses its row.

use crate::error::Result;
use crate::scanners::{
    directory, file_stem, path_str, FileScanner, FileToScan, ScanContext, ScanOutcome,
};
use aria_metadata::parse_playlist;
use aria_storage::playlists::{self, CreatePlaylistFile};
use async_trait::async_trait;
use sqlx::SqliteConnection;

const EXTENSIONS: &[&str] = &["m3u", "m3u8"];

#[derive(Default)]
pub struct PlaylistFileScanner;

impl PlaylistFileScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileScanner for PlaylistFileScanner {
    fn name(&self) -> &'static str {
        "playlist"
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
        let existing = playlists::get_by_path(conn, &path_str(&file.path)).await?;
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
        let existed = playlists::get_by_path(conn, &file_path).await?.is_some();

        let text = match std::fs::read_to_string(&file.path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %file_path, error = %err, "cannot read playlist file");
                if existed {
                    playlists::remove_by_path(conn, &file_path).await?;
                    return Ok(ScanOutcome::Removed);
                }
                return Ok(ScanOutcome::Failed);
            }
        };

        let parsed = parse_playlist(&text);
        let name = parsed.name.unwrap_or_else(|| file_stem(&file.path));

        playlists::upsert(
            conn,
            &CreatePlaylistFile {
                file_path,
                file_last_write: file.last_write,
                scan_version: ctx.scan_version,
                name,
                directory: directory(&file.path),
                entries: parsed.entries,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_playlist_extensions_only() {
        assert!(EXTENSIONS.contains(&"m3u"));
        assert!(EXTENSIONS.contains(&"m3u8"));
        assert!(!EXTENSIONS.contains(&"pls"));
    }
}
