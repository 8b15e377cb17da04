//! Playlist files
//!
//! Sidecar `.m3u`/`.m3u8` files indexed with their entry paths. Entries are
//! resolved to track rows by exact path in post-scan maintenance and
//! re-resolved after each scan, since the referenced track may be indexed
//! after the playlist.

use crate::error::Result;
use aria_core::TrackId;
use sqlx::{Row, SqliteConnection};

pub type PlaylistFileId = i64;

#[derive(Debug, Clone)]
pub struct PlaylistFile {
    pub id: PlaylistFileId,
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub name: String,
    pub directory: String,
}

#[derive(Debug, Clone)]
pub struct CreatePlaylistFile {
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub name: String,
    pub directory: String,
    /// Entry paths as written in the file, absolute or relative to
    /// `directory`
    pub entries: Vec<String>,
}

/// One line of a playlist file, resolved to a track when the target path is
/// indexed
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    pub position: i64,
    pub target_path: String,
    pub track_id: Option<TrackId>,
}

const COLUMNS: &str = "id, file_path, file_last_write, scan_version, name, directory";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> PlaylistFile {
    PlaylistFile {
        id: row.get("id"),
        file_path: row.get("file_path"),
        file_last_write: row.get("file_last_write"),
        scan_version: row.get("scan_version"),
        name: row.get("name"),
        directory: row.get("directory"),
    }
}

pub async fn get_by_path(
    conn: &mut SqliteConnection,
    file_path: &str,
) -> Result<Option<PlaylistFile>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM playlist_file WHERE file_path = ?"
    ))
    .bind(file_path)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(from_row))
}

/// Insert or refresh the row for this path; the entry list is rebuilt and
/// track associations re-resolved by post-scan maintenance
pub async fn upsert(
    conn: &mut SqliteConnection,
    playlist: &CreatePlaylistFile,
) -> Result<PlaylistFileId> {
    sqlx::query(
        "INSERT INTO playlist_file (file_path, file_last_write, scan_version, name, directory)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(file_path) DO UPDATE SET
            file_last_write = excluded.file_last_write,
            scan_version = excluded.scan_version,
            name = excluded.name,
            directory = excluded.directory",
    )
    .bind(&playlist.file_path)
    .bind(playlist.file_last_write)
    .bind(playlist.scan_version)
    .bind(&playlist.name)
    .bind(&playlist.directory)
    .execute(&mut *conn)
    .await?;

    let id: PlaylistFileId =
        sqlx::query_scalar("SELECT id FROM playlist_file WHERE file_path = ?")
            .bind(&playlist.file_path)
            .fetch_one(&mut *conn)
            .await?;

    sqlx::query("DELETE FROM playlist_file_entry WHERE playlist_file_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    for (position, target_path) in playlist.entries.iter().enumerate() {
        sqlx::query(
            "INSERT INTO playlist_file_entry (playlist_file_id, position, target_path)
             VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(position as i64)
        .bind(target_path)
        .execute(&mut *conn)
        .await?;
    }

    Ok(id)
}

pub async fn remove_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM playlist_file WHERE file_path = ?")
        .bind(file_path)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All indexed playlist paths under a library root prefix
pub async fn list_paths_under(
    conn: &mut SqliteConnection,
    root_path: &str,
) -> Result<Vec<(PlaylistFileId, String)>> {
    let rows = sqlx::query("SELECT id, file_path FROM playlist_file WHERE file_path LIKE ? || '%'")
        .bind(root_path)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("id"), row.get("file_path")))
        .collect())
}

/// Resolve dangling entries against indexed tracks by exact path
///
/// Relative entry paths are anchored at the playlist's directory. Entries
/// whose target is not indexed stay unresolved and are retried on the next
/// run.
pub async fn associate_tracks(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE playlist_file_entry SET track_id = (
            SELECT t.id FROM track t
            WHERE t.file_path = CASE
                WHEN playlist_file_entry.target_path LIKE '/%'
                    THEN playlist_file_entry.target_path
                ELSE (SELECT p.directory FROM playlist_file p
                      WHERE p.id = playlist_file_entry.playlist_file_id)
                     || '/' || playlist_file_entry.target_path
            END
         )
         WHERE track_id IS NULL",
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Entries of one playlist, in file order
pub async fn entries(
    conn: &mut SqliteConnection,
    playlist: PlaylistFileId,
) -> Result<Vec<PlaylistEntry>> {
    let rows = sqlx::query(
        "SELECT position, target_path, track_id FROM playlist_file_entry
         WHERE playlist_file_id = ? ORDER BY position",
    )
    .bind(playlist)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PlaylistEntry {
            position: row.get("position"),
            target_path: row.get("target_path"),
            track_id: row.get("track_id"),
        })
        .collect())
}

/// Resolved track ids of one playlist, in file order, unresolved entries
/// skipped
pub async fn track_ids(
    conn: &mut SqliteConnection,
    playlist: PlaylistFileId,
) -> Result<Vec<TrackId>> {
    let ids: Vec<TrackId> = sqlx::query_scalar(
        "SELECT track_id FROM playlist_file_entry
         WHERE playlist_file_id = ? AND track_id IS NOT NULL ORDER BY position",
    )
    .bind(playlist)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}
