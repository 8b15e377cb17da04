//! Media library roots

use crate::error::{Result, StorageError};
use aria_core::{MediaLibrary, MediaLibraryId};
use sqlx::{Row, SqliteConnection};

fn from_row(row: &sqlx::sqlite::SqliteRow) -> MediaLibrary {
    MediaLibrary {
        id: row.get("id"),
        name: row.get("name"),
        root_path: row.get("root_path"),
    }
}

pub async fn get_all(conn: &mut SqliteConnection) -> Result<Vec<MediaLibrary>> {
    let rows = sqlx::query("SELECT id, name, root_path FROM media_library ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn get_by_id(
    conn: &mut SqliteConnection,
    id: MediaLibraryId,
) -> Result<Option<MediaLibrary>> {
    let row = sqlx::query("SELECT id, name, root_path FROM media_library WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn create(
    conn: &mut SqliteConnection,
    name: &str,
    root_path: &str,
) -> Result<MediaLibrary> {
    let result = sqlx::query("INSERT INTO media_library (name, root_path) VALUES (?, ?)")
        .bind(name)
        .bind(root_path)
        .execute(&mut *conn)
        .await?;

    let id = result.last_insert_rowid();
    get_by_id(conn, id)
        .await?
        .ok_or_else(|| StorageError::not_found("MediaLibrary", id))
}

/// Deregister a root and drop everything indexed under it
///
/// Tracks go by library id, sidecar rows by path prefix; link rows cascade.
/// Entities the removed tracks leave orphaned (artists, releases, clusters)
/// are swept by the next scan's maintenance.
pub async fn remove(conn: &mut SqliteConnection, id: MediaLibraryId) -> Result<()> {
    let Some(library) = get_by_id(&mut *conn, id).await? else {
        return Ok(());
    };

    sqlx::query("DELETE FROM track WHERE media_library_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    for table in ["track_lyrics", "image", "playlist_file"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE file_path LIKE ? || '%'"))
            .bind(&library.root_path)
            .execute(&mut *conn)
            .await?;
    }

    sqlx::query("DELETE FROM media_library WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
