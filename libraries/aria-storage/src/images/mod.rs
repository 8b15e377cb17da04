//! Image files
//!
//! Artwork indexed by path. `is_cover` marks files whose stem matches the
//! configured cover names; cover lookup for a release walks the directories
//! of its tracks.

use crate::error::Result;
use sqlx::{Row, SqliteConnection};

pub type ImageId = i64;

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub id: ImageId,
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub file_stem: String,
    pub directory: String,
    pub is_cover: bool,
}

#[derive(Debug, Clone)]
pub struct CreateImageFile {
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub file_stem: String,
    pub directory: String,
    pub is_cover: bool,
}

const COLUMNS: &str = "id, file_path, file_last_write, scan_version, file_stem, directory, is_cover";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> ImageFile {
    ImageFile {
        id: row.get("id"),
        file_path: row.get("file_path"),
        file_last_write: row.get("file_last_write"),
        scan_version: row.get("scan_version"),
        file_stem: row.get("file_stem"),
        directory: row.get("directory"),
        is_cover: row.get("is_cover"),
    }
}

pub async fn get_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<Option<ImageFile>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM image WHERE file_path = ?"))
        .bind(file_path)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn upsert(conn: &mut SqliteConnection, image: &CreateImageFile) -> Result<ImageId> {
    let result = sqlx::query(
        "INSERT INTO image (file_path, file_last_write, scan_version, file_stem, directory, is_cover)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(file_path) DO UPDATE SET
            file_last_write = excluded.file_last_write,
            scan_version = excluded.scan_version,
            file_stem = excluded.file_stem,
            directory = excluded.directory,
            is_cover = excluded.is_cover",
    )
    .bind(&image.file_path)
    .bind(image.file_last_write)
    .bind(image.scan_version)
    .bind(&image.file_stem)
    .bind(&image.directory)
    .bind(image.is_cover)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn remove_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM image WHERE file_path = ?")
        .bind(file_path)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All indexed image paths under a library root prefix
pub async fn list_paths_under(
    conn: &mut SqliteConnection,
    root_path: &str,
) -> Result<Vec<(ImageId, String)>> {
    let rows = sqlx::query("SELECT id, file_path FROM image WHERE file_path LIKE ? || '%'")
        .bind(root_path)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("id"), row.get("file_path")))
        .collect())
}

/// Cover image in a directory, if one was indexed
pub async fn find_cover_in_directory(
    conn: &mut SqliteConnection,
    directory: &str,
) -> Result<Option<ImageFile>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM image
         WHERE directory = ? AND is_cover = 1
         ORDER BY file_stem LIMIT 1"
    ))
    .bind(directory)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(from_row))
}
