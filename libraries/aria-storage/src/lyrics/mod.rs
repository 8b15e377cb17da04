//! External lyrics files
//!
//! Sidecar `.lrc`/`.txt` files indexed next to audio files. Association to a
//! track is by directory plus file stem and is re-resolved after each scan,
//! since either side may appear first.

use crate::error::Result;
use aria_core::{MediaLibraryId, TrackId};
use sqlx::{Row, SqliteConnection};

pub type LyricsId = i64;

#[derive(Debug, Clone)]
pub struct LyricsFile {
    pub id: LyricsId,
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub file_stem: String,
    pub directory: String,
    pub track_id: Option<TrackId>,
}

#[derive(Debug, Clone)]
pub struct CreateLyricsFile {
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub file_stem: String,
    pub directory: String,
}

const COLUMNS: &str = "id, file_path, file_last_write, scan_version, file_stem, directory, track_id";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> LyricsFile {
    LyricsFile {
        id: row.get("id"),
        file_path: row.get("file_path"),
        file_last_write: row.get("file_last_write"),
        scan_version: row.get("scan_version"),
        file_stem: row.get("file_stem"),
        directory: row.get("directory"),
        track_id: row.get("track_id"),
    }
}

pub async fn get_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<Option<LyricsFile>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM track_lyrics WHERE file_path = ?"))
        .bind(file_path)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Insert or refresh the row for this path; the track association is reset
/// and re-resolved by post-scan maintenance
pub async fn upsert(conn: &mut SqliteConnection, lyrics: &CreateLyricsFile) -> Result<LyricsId> {
    let result = sqlx::query(
        "INSERT INTO track_lyrics (file_path, file_last_write, scan_version, file_stem, directory)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(file_path) DO UPDATE SET
            file_last_write = excluded.file_last_write,
            scan_version = excluded.scan_version,
            file_stem = excluded.file_stem,
            directory = excluded.directory,
            track_id = NULL",
    )
    .bind(&lyrics.file_path)
    .bind(lyrics.file_last_write)
    .bind(lyrics.scan_version)
    .bind(&lyrics.file_stem)
    .bind(&lyrics.directory)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn remove_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM track_lyrics WHERE file_path = ?")
        .bind(file_path)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All indexed lyrics paths under a library root prefix
pub async fn list_paths_under(
    conn: &mut SqliteConnection,
    root_path: &str,
) -> Result<Vec<(LyricsId, String)>> {
    let rows = sqlx::query(
        "SELECT id, file_path FROM track_lyrics WHERE file_path LIKE ? || '%'",
    )
    .bind(root_path)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("id"), row.get("file_path")))
        .collect())
}

/// Associate dangling lyrics rows with the audio track sharing their
/// directory and file stem
///
/// The prefix comparison is literal, so stems containing `%` or `_` never
/// match a different track the way a LIKE pattern would.
pub async fn associate_tracks(
    conn: &mut SqliteConnection,
    media_library: MediaLibraryId,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE track_lyrics SET track_id = (
            SELECT t.id FROM track t
            WHERE t.media_library_id = ?
              AND substr(t.file_path, 1,
                         length(track_lyrics.directory) + length(track_lyrics.file_stem) + 2)
                  = track_lyrics.directory || '/' || track_lyrics.file_stem || '.'
              AND instr(substr(t.file_path,
                               length(track_lyrics.directory) + length(track_lyrics.file_stem) + 3),
                        '/') = 0
            LIMIT 1
         )
         WHERE track_id IS NULL",
    )
    .bind(media_library)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_for_track(conn: &mut SqliteConnection, track: TrackId) -> Result<Vec<LyricsFile>> {
    let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM track_lyrics WHERE track_id = ?"))
        .bind(track)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.iter().map(from_row).collect())
}
