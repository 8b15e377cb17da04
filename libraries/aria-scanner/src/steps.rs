//! Post-scan maintenance steps
//!
//! Run after the file pass: drop rows for files gone from disk, delete
//! entities nothing references anymore, refresh the cached counts and pair
//! lyrics files with their tracks.

use crate::error::Result;
use aria_core::MediaLibrary;
use aria_storage::{artists, clusters, images, lyrics, playlists, releases, tracks};
use sqlx::SqliteConnection;
use std::path::Path;

/// Delete index rows whose file no longer exists on disk
pub(crate) async fn remove_missing_files(
    conn: &mut SqliteConnection,
    library: &MediaLibrary,
) -> Result<u64> {
    let mut removed = 0;

    for (id, path) in tracks::list_paths(conn, library.id).await? {
        if !Path::new(&path).is_file() {
            tracing::debug!(path, "removing track for missing file");
            tracks::remove(conn, id).await?;
            removed += 1;
        }
    }

    for (_, path) in lyrics::list_paths_under(conn, &library.root_path).await? {
        if !Path::new(&path).is_file() {
            removed += lyrics::remove_by_path(conn, &path).await?;
        }
    }

    for (_, path) in images::list_paths_under(conn, &library.root_path).await? {
        if !Path::new(&path).is_file() {
            removed += images::remove_by_path(conn, &path).await?;
        }
    }

    for (_, path) in playlists::list_paths_under(conn, &library.root_path).await? {
        if !Path::new(&path).is_file() {
            removed += playlists::remove_by_path(conn, &path).await?;
        }
    }

    Ok(removed)
}

/// Delete entities no track references anymore
pub(crate) async fn remove_orphaned_entries(conn: &mut SqliteConnection) -> Result<()> {
    let releases = releases::remove_orphans(conn).await?;
    let artists = artists::remove_orphans(conn).await?;
    let clusters = clusters::remove_empty(conn).await?;

    if releases + artists + clusters > 0 {
        tracing::debug!(releases, artists, clusters, "removed orphaned entries");
    }

    Ok(())
}

/// Refresh denormalized counts from their source tables
pub(crate) async fn recompute_caches(conn: &mut SqliteConnection) -> Result<()> {
    releases::recompute_counts(conn).await?;
    clusters::recompute_counts(conn).await?;
    Ok(())
}

/// Pair dangling lyrics rows with tracks sharing directory and stem
pub(crate) async fn associate_lyrics(
    conn: &mut SqliteConnection,
    library: &MediaLibrary,
) -> Result<()> {
    let paired = lyrics::associate_tracks(conn, library.id).await?;
    if paired > 0 {
        tracing::debug!(paired, library = %library.name, "associated lyrics files");
    }
    Ok(())
}

/// Resolve dangling playlist entries against indexed tracks
pub(crate) async fn associate_playlist_tracks(conn: &mut SqliteConnection) -> Result<()> {
    let resolved = playlists::associate_tracks(conn).await?;
    if resolved > 0 {
        tracing::debug!(resolved, "resolved playlist entries");
    }
    Ok(())
}
