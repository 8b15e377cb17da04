//! Starred entities
//!
//! Per-user star flags on tracks, releases and artists. Starring is
//! idempotent; the find queries filter on these tables via `starred_by`.

use crate::error::Result;
use aria_core::{ArtistId, ReleaseId, TrackId, UserId};
use sqlx::SqliteConnection;

pub async fn star_track(
    conn: &mut SqliteConnection,
    user: UserId,
    track: TrackId,
    starred_at: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO starred_track (user_id, track_id, starred_at) VALUES (?, ?, ?)",
    )
    .bind(user)
    .bind(track)
    .bind(starred_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn unstar_track(conn: &mut SqliteConnection, user: UserId, track: TrackId) -> Result<()> {
    sqlx::query("DELETE FROM starred_track WHERE user_id = ? AND track_id = ?")
        .bind(user)
        .bind(track)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn is_track_starred(
    conn: &mut SqliteConnection,
    user: UserId,
    track: TrackId,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM starred_track WHERE user_id = ? AND track_id = ?",
    )
    .bind(user)
    .bind(track)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}

pub async fn star_release(
    conn: &mut SqliteConnection,
    user: UserId,
    release: ReleaseId,
    starred_at: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO starred_release (user_id, release_id, starred_at) VALUES (?, ?, ?)",
    )
    .bind(user)
    .bind(release)
    .bind(starred_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn unstar_release(
    conn: &mut SqliteConnection,
    user: UserId,
    release: ReleaseId,
) -> Result<()> {
    sqlx::query("DELETE FROM starred_release WHERE user_id = ? AND release_id = ?")
        .bind(user)
        .bind(release)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn is_release_starred(
    conn: &mut SqliteConnection,
    user: UserId,
    release: ReleaseId,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM starred_release WHERE user_id = ? AND release_id = ?",
    )
    .bind(user)
    .bind(release)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}

pub async fn star_artist(
    conn: &mut SqliteConnection,
    user: UserId,
    artist: ArtistId,
    starred_at: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO starred_artist (user_id, artist_id, starred_at) VALUES (?, ?, ?)",
    )
    .bind(user)
    .bind(artist)
    .bind(starred_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn unstar_artist(
    conn: &mut SqliteConnection,
    user: UserId,
    artist: ArtistId,
) -> Result<()> {
    sqlx::query("DELETE FROM starred_artist WHERE user_id = ? AND artist_id = ?")
        .bind(user)
        .bind(artist)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn is_artist_starred(
    conn: &mut SqliteConnection,
    user: UserId,
    artist: ArtistId,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM starred_artist WHERE user_id = ? AND artist_id = ?",
    )
    .bind(user)
    .bind(artist)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}
