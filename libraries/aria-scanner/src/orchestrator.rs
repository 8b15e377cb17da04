//! Scan orchestration
//!
//! Drives one full scan: discover files under each media library root,
//! dispatch them to the scanner claiming their extension, then run the
//! maintenance steps. Reads and writes never share a transaction; each file
//! that needs indexing gets its own short write transaction, so an abort or
//! a per-file failure loses at most that one file.

use crate::error::Result;
use crate::scanners::{
    AudioFileScanner, FileScanner, FileToScan, ImageFileScanner, LyricsFileScanner,
    PlaylistFileScanner, ScanContext, ScanOutcome,
};
use crate::steps;
use aria_core::{MediaLibrary, MediaLibraryId};
use aria_metadata::MetadataParser;
use aria_storage::settings::ScanSettings;
use aria_storage::{media_libraries, settings, Session};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Options for one scan run
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Bump the scan version first, re-evaluating every file even when
    /// unchanged on disk
    pub force_rescan: bool,
    /// Run `VACUUM` after a completed scan
    pub compact: bool,
    /// Restrict the run to these libraries; empty means all
    pub libraries: Vec<MediaLibraryId>,
}

/// Counters for one scan run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files matched to a scanner
    pub seen: u64,
    /// Files unchanged since their last scan
    pub skipped: u64,
    pub added: u64,
    pub updated: u64,
    pub removed: u64,
    /// Files that could not be indexed
    pub failed: u64,
    /// True when the run stopped on the abort flag
    pub aborted: bool,
}

pub struct ScanOrchestrator {
    session: Session,
    scanners: Vec<Box<dyn FileScanner>>,
    abort: Arc<AtomicBool>,
}

impl ScanOrchestrator {
    pub fn new(session: Session, parser: Arc<dyn MetadataParser>) -> Self {
        let scanners: Vec<Box<dyn FileScanner>> = vec![
            Box::new(AudioFileScanner::new(parser)),
            Box::new(LyricsFileScanner::new()),
            Box::new(ImageFileScanner::new()),
            Box::new(PlaylistFileScanner::new()),
        ];

        Self {
            session,
            scanners,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked between files; setting it stops the run at the next
    /// file boundary. [`Self::scan`] clears it on return, so a later run
    /// starts fresh
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// The underlying session, for callers managing libraries and settings
    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Run one scan over all media libraries
    pub async fn scan(&mut self, options: ScanOptions) -> Result<ScanStats> {
        let mut stats = ScanStats::default();

        if options.force_rescan {
            let mut tx = self.session.write_tx().await?;
            let version = settings::bump_scan_version(tx.conn()).await?;
            tx.commit().await?;
            tracing::info!(version, "forced rescan, scan version bumped");
        }

        let (scan_settings, mut libraries) = {
            let mut tx = self.session.read_tx().await?;
            let scan_settings = settings::get(tx.conn()).await?;
            let libraries = media_libraries::get_all(tx.conn()).await?;
            (scan_settings, libraries)
        };
        if !options.libraries.is_empty() {
            libraries.retain(|library| options.libraries.contains(&library.id));
        }

        for library in &libraries {
            if self.aborted() {
                stats.aborted = true;
                break;
            }
            tracing::info!(library = %library.name, root = %library.root_path, "scanning");
            self.scan_library(library, &scan_settings, &mut stats).await?;
        }

        if !stats.aborted {
            for library in &libraries {
                let mut tx = self.session.write_tx().await?;
                stats.removed += steps::remove_missing_files(tx.conn(), library).await?;
                steps::associate_lyrics(tx.conn(), library).await?;
                tx.commit().await?;
            }

            let mut tx = self.session.write_tx().await?;
            steps::associate_playlist_tracks(tx.conn()).await?;
            steps::remove_orphaned_entries(tx.conn()).await?;
            steps::recompute_caches(tx.conn()).await?;
            tx.commit().await?;

            if options.compact {
                // VACUUM cannot run inside a transaction
                sqlx::query("VACUUM")
                    .execute(self.session.pool())
                    .await
                    .map_err(aria_storage::StorageError::from)?;
            }
        }

        // The flag is consumed by the run it stopped
        self.abort.store(false, Ordering::Relaxed);

        tracing::info!(?stats, "scan finished");
        Ok(stats)
    }

    async fn scan_library(
        &mut self,
        library: &MediaLibrary,
        scan_settings: &ScanSettings,
        stats: &mut ScanStats,
    ) -> Result<()> {
        let ctx = ScanContext {
            scan_version: scan_settings.scan_version,
            extra_tags: scan_settings.extra_tags.clone(),
            media_library: library.clone(),
        };

        let walker = WalkDir::new(&library.root_path)
            .follow_links(false)
            .into_iter()
            // The root itself may carry a dotted name; only prune below it
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

        for entry in walker {
            if self.aborted() {
                stats.aborted = true;
                return Ok(());
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot read directory entry");
                    stats.failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(scanner) = scanner_for(&self.scanners, entry.path()) else {
                continue;
            };

            let file = match file_to_scan(entry.path()) {
                Ok(file) => file,
                Err(err) => {
                    tracing::warn!(path = %entry.path().display(), error = %err, "cannot stat file");
                    stats.failed += 1;
                    continue;
                }
            };
            stats.seen += 1;

            let needs_scan = {
                let mut tx = self.session.read_tx().await?;
                scanner.needs_scan(tx.conn(), &ctx, &file).await?
            };
            if !needs_scan {
                stats.skipped += 1;
                continue;
            }

            let mut tx = self.session.write_tx().await?;
            match scanner.scan_file(tx.conn(), &ctx, &file).await {
                Ok(outcome) => {
                    tx.commit().await?;
                    match outcome {
                        ScanOutcome::Added => stats.added += 1,
                        ScanOutcome::Updated => stats.updated += 1,
                        ScanOutcome::Removed => stats.removed += 1,
                        ScanOutcome::Failed => stats.failed += 1,
                    }
                }
                Err(err) => {
                    // Guard dropped, transaction rolled back; the file is
                    // retried on the next run
                    tracing::error!(path = %file.path.display(), error = %err, "scan failed");
                    stats.failed += 1;
                }
            }
        }

        Ok(())
    }

}

fn scanner_for<'a>(
    scanners: &'a [Box<dyn FileScanner>],
    path: &Path,
) -> Option<&'a dyn FileScanner> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    scanners
        .iter()
        .find(|scanner| scanner.supported_extensions().contains(&extension.as_str()))
        .map(AsRef::as_ref)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn file_to_scan(path: &Path) -> std::io::Result<FileToScan> {
    let metadata = std::fs::metadata(path)?;
    let last_write = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Ok(FileToScan {
        path: path.to_path_buf(),
        last_write,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_paths_are_skipped() {
        assert!(is_hidden(Path::new("/music/.stversions")));
        assert!(is_hidden(Path::new("/music/.hidden.flac")));
        assert!(!is_hidden(Path::new("/music/album/01.flac")));
    }
}
