//! Clusters
//!
//! Tag dimensions and their values. `get_or_create` pairs back the indexer's
//! parsed multi-values onto stable rows; the counts cache and the empty-row
//! sweep run as post-scan maintenance.

use crate::error::{Result, StorageError};
use aria_core::{Cluster, ClusterId, ClusterType, ClusterTypeId, TrackId};
use sqlx::{Row, SqliteConnection};

fn type_from_row(row: &sqlx::sqlite::SqliteRow) -> ClusterType {
    ClusterType {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Cluster {
    Cluster {
        id: row.get("id"),
        cluster_type_id: row.get("cluster_type_id"),
        name: row.get("name"),
        track_count: row.get("track_count"),
        release_count: row.get("release_count"),
    }
}

const COLUMNS: &str = "id, cluster_type_id, name, track_count, release_count";

pub async fn get_type_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<ClusterType>> {
    let row = sqlx::query("SELECT id, name FROM cluster_type WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(type_from_row))
}

pub async fn get_all_types(conn: &mut SqliteConnection) -> Result<Vec<ClusterType>> {
    let rows = sqlx::query("SELECT id, name FROM cluster_type ORDER BY name")
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.iter().map(type_from_row).collect())
}

pub async fn get_or_create_type(conn: &mut SqliteConnection, name: &str) -> Result<ClusterType> {
    if let Some(existing) = get_type_by_name(&mut *conn, name).await? {
        return Ok(existing);
    }

    let result = sqlx::query("INSERT INTO cluster_type (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    Ok(ClusterType {
        id: result.last_insert_rowid(),
        name: name.to_owned(),
    })
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: ClusterId) -> Result<Option<Cluster>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM cluster WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn find_by_type_and_name(
    conn: &mut SqliteConnection,
    cluster_type: ClusterTypeId,
    name: &str,
) -> Result<Option<Cluster>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM cluster WHERE cluster_type_id = ? AND name = ?"
    ))
    .bind(cluster_type)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn get_or_create(
    conn: &mut SqliteConnection,
    cluster_type: ClusterTypeId,
    name: &str,
) -> Result<Cluster> {
    if let Some(existing) = find_by_type_and_name(&mut *conn, cluster_type, name).await? {
        return Ok(existing);
    }

    let result = sqlx::query("INSERT INTO cluster (cluster_type_id, name) VALUES (?, ?)")
        .bind(cluster_type)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let id = result.last_insert_rowid();
    get_by_id(conn, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Cluster", id))
}

pub async fn list_by_type(
    conn: &mut SqliteConnection,
    cluster_type: ClusterTypeId,
) -> Result<Vec<Cluster>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM cluster WHERE cluster_type_id = ? ORDER BY name COLLATE NOCASE"
    ))
    .bind(cluster_type)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn link_track(
    conn: &mut SqliteConnection,
    track: TrackId,
    cluster: ClusterId,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO track_cluster (track_id, cluster_id) VALUES (?, ?)")
        .bind(track)
        .bind(cluster)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn clear_track_links(conn: &mut SqliteConnection, track: TrackId) -> Result<()> {
    sqlx::query("DELETE FROM track_cluster WHERE track_id = ?")
        .bind(track)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Cluster ids a track belongs to
pub async fn get_track_links(
    conn: &mut SqliteConnection,
    track: TrackId,
) -> Result<Vec<ClusterId>> {
    let ids: Vec<ClusterId> =
        sqlx::query_scalar("SELECT cluster_id FROM track_cluster WHERE track_id = ?")
            .bind(track)
            .fetch_all(&mut *conn)
            .await?;

    Ok(ids)
}

/// Recompute the cached membership counts from the link table
pub async fn recompute_counts(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        "UPDATE cluster SET
            track_count = (SELECT COUNT(*) FROM track_cluster tc
                           WHERE tc.cluster_id = cluster.id),
            release_count = (SELECT COUNT(DISTINCT t.release_id) FROM track_cluster tc
                             INNER JOIN track t ON t.id = tc.track_id
                             WHERE tc.cluster_id = cluster.id AND t.release_id IS NOT NULL)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Delete clusters with no remaining members, then types with no clusters
pub async fn remove_empty(conn: &mut SqliteConnection) -> Result<u64> {
    let clusters = sqlx::query(
        "DELETE FROM cluster
         WHERE id NOT IN (SELECT DISTINCT cluster_id FROM track_cluster)",
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "DELETE FROM cluster_type
         WHERE id NOT IN (SELECT DISTINCT cluster_type_id FROM cluster)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(clusters.rows_affected())
}
