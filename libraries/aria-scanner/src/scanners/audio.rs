//! Audio file scanner
//!
//! The heart of the pipeline: parses embedded tags, resolves artist and
//! release credits, refreshes the track row and rebuilds its cluster
//! membership. A file that was indexed before but can no longer be parsed
//! loses its row.

use crate::cluster_indexer;
use crate::error::Result;
use crate::resolver;
use crate::scanners::{file_stem, path_str, FileScanner, FileToScan, ScanContext, ScanOutcome};
use aria_core::{ArtistLinkType, CreateTrack};
use aria_metadata::{MetadataParser, ParsedArtist, ParsedTrack};
use aria_storage::tracks;
use async_trait::async_trait;
use sqlx::SqliteConnection;
use std::sync::Arc;

const EXTENSIONS: &[&str] = &[
    "aac", "aiff", "ape", "flac", "m4a", "m4b", "mp3", "mpc", "ogg", "opus", "wav", "wv",
];

pub struct AudioFileScanner {
    parser: Arc<dyn MetadataParser>,
}

impl AudioFileScanner {
    pub fn new(parser: Arc<dyn MetadataParser>) -> Self {
        Self { parser }
    }

    async fn persist(
        &self,
        conn: &mut SqliteConnection,
        ctx: &ScanContext,
        file: &FileToScan,
        parsed: ParsedTrack,
        existing_id: Option<i64>,
    ) -> Result<ScanOutcome> {
        let release_id = match &parsed.release {
            Some(release) => Some(resolver::resolve_release(conn, release).await?.id),
            None => None,
        };

        let name = parsed
            .title
            .clone()
            .unwrap_or_else(|| file_stem(&file.path));

        let create = CreateTrack {
            file_path: path_str(&file.path),
            file_last_write: file.last_write,
            scan_version: ctx.scan_version,
            name,
            duration_ms: parsed.duration_ms,
            track_number: parsed.track_number,
            disc_number: parsed.disc_number,
            date: parsed.date.clone(),
            original_date: parsed.original_date.clone(),
            year: parsed.year,
            bitrate: parsed.bitrate,
            rating: parsed.rating,
            has_cover: parsed.has_cover,
            track_replay_gain: parsed.track_replay_gain,
            release_replay_gain: parsed.release_replay_gain,
            copyright: parsed.copyright.clone(),
            recording_mbid: parsed.recording_mbid.clone(),
            release_id,
            media_library_id: ctx.media_library.id,
        };

        let (track_id, outcome) = match existing_id {
            Some(id) => {
                tracks::update(conn, id, &create).await?;
                (id, ScanOutcome::Updated)
            }
            None => {
                let now = chrono::Utc::now().timestamp();
                let id = tracks::create(conn, &create, now).await?;
                (id, ScanOutcome::Added)
            }
        };

        tracks::clear_artist_links(conn, track_id).await?;
        for artist in &parsed.artists {
            let resolved = resolver::resolve_artist(conn, artist).await?;
            tracks::add_artist_link(conn, track_id, resolved.id, ArtistLinkType::Primary, None)
                .await?;
        }
        for (names, link_type) in [
            (&parsed.composers, ArtistLinkType::Composer),
            (&parsed.conductors, ArtistLinkType::Conductor),
            (&parsed.lyricists, ArtistLinkType::Lyricist),
            (&parsed.mixers, ArtistLinkType::Mixer),
            (&parsed.producers, ArtistLinkType::Producer),
            (&parsed.remixers, ArtistLinkType::Remixer),
        ] {
            for name in names {
                let resolved = resolver::resolve_artist(conn, &ParsedArtist::new(name)).await?;
                tracks::add_artist_link(conn, track_id, resolved.id, link_type, None).await?;
            }
        }
        for performer in &parsed.performers {
            let resolved =
                resolver::resolve_artist(conn, &ParsedArtist::new(&performer.name)).await?;
            tracks::add_artist_link(
                conn,
                track_id,
                resolved.id,
                ArtistLinkType::Performer,
                performer.subrole.as_deref(),
            )
            .await?;
        }

        cluster_indexer::index_track(conn, track_id, &parsed.tags).await?;

        Ok(outcome)
    }
}

#[async_trait]
impl FileScanner for AudioFileScanner {
    fn name(&self) -> &'static str {
        "audio"
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
        let existing = tracks::get_by_path(conn, &path_str(&file.path)).await?;
        Ok(match existing {
            Some(track) => {
                track.file_last_write != file.last_write || track.scan_version < ctx.scan_version
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
        let existing = tracks::get_by_path(conn, &file_path).await?;

        match self.parser.parse(&file.path, &ctx.extra_tags) {
            Ok(parsed) => {
                self.persist(conn, ctx, file, parsed, existing.map(|t| t.id))
                    .await
            }
            Err(err) => {
                tracing::warn!(path = %file_path, error = %err, "cannot parse audio file");
                if let Some(track) = existing {
                    tracks::remove(conn, track.id).await?;
                    Ok(ScanOutcome::Removed)
                } else {
                    Ok(ScanOutcome::Failed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_common_audio_extensions() {
        let scanner_exts = EXTENSIONS;
        for ext in ["flac", "mp3", "ogg", "opus", "m4a"] {
            assert!(scanner_exts.contains(&ext));
        }
        assert!(!scanner_exts.contains(&"jpg"));
        assert!(!scanner_exts.contains(&"lrc"));
    }

    #[test]
    fn stem_is_sane_fallback_title() {
        assert_eq!(file_stem(std::path::Path::new("/m/01 - Song.flac")), "01 - Song");
    }
}
