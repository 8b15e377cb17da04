//! Releases
//!
//! The `medium_count`/`track_count` columns are caches recomputed by
//! post-scan maintenance; queries that need the truth derive it from the
//! track table.

use crate::error::{Result, StorageError};
use crate::query::{push_cluster_filter, push_range, Range, RangeResults, WhereClause};
use aria_core::{ArtistId, ClusterId, CreateRelease, MediaLibraryId, Release, ReleaseId, UserId};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

const COLUMNS: &str =
    "id, name, mbid, release_type, artist_display_name, medium_count, track_count";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Release {
    Release {
        id: row.get("id"),
        name: row.get("name"),
        mbid: row.get("mbid"),
        release_type: row.get("release_type"),
        artist_display_name: row.get("artist_display_name"),
        medium_count: row.get("medium_count"),
        track_count: row.get("track_count"),
    }
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: ReleaseId) -> Result<Option<Release>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM \"release\" WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn find_by_mbid(conn: &mut SqliteConnection, mbid: &str) -> Result<Option<Release>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM \"release\" WHERE mbid = ?"))
        .bind(mbid)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Releases with this exact name that carry no external identifier
pub async fn find_by_name_without_mbid(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Vec<Release>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM \"release\" WHERE name = ? AND mbid IS NULL"
    ))
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn create(conn: &mut SqliteConnection, release: CreateRelease) -> Result<Release> {
    let result = sqlx::query(
        "INSERT INTO \"release\" (name, mbid, release_type, artist_display_name)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&release.name)
    .bind(&release.mbid)
    .bind(&release.release_type)
    .bind(&release.artist_display_name)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    get_by_id(conn, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Release", id))
}

pub async fn update_name(
    conn: &mut SqliteConnection,
    id: ReleaseId,
    name: &str,
    artist_display_name: &str,
) -> Result<()> {
    sqlx::query("UPDATE \"release\" SET name = ?, artist_display_name = ? WHERE id = ?")
        .bind(name)
        .bind(artist_display_name)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Recompute the cached medium/track counts from actual track rows
pub async fn recompute_counts(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        "UPDATE \"release\" SET
            track_count = (SELECT COUNT(*) FROM track t WHERE t.release_id = \"release\".id),
            medium_count = (SELECT COUNT(DISTINCT COALESCE(t.disc_number, 1))
                            FROM track t WHERE t.release_id = \"release\".id)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Delete releases no track references anymore
pub async fn remove_orphans(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM \"release\"
         WHERE id NOT IN (SELECT DISTINCT release_id FROM track WHERE release_id IS NOT NULL)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Sort order for release listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleaseSortMethod {
    /// Store order
    #[default]
    None,
    Name,
    ArtistNameThenName,
    DateAsc,
    DateDesc,
    LastWritten,
    Random,
}

/// Query parameters for release find/count
#[derive(Debug, Clone, Default)]
pub struct ReleaseFindParameters {
    pub sort_method: ReleaseSortMethod,
    pub range: Option<Range>,
    /// Result must be a member of all of these clusters
    pub clusters: Vec<ClusterId>,
    pub media_library: Option<MediaLibraryId>,
    pub artist: Option<ArtistId>,
    /// Inclusive year bounds, matched against any owned track
    pub year_range: Option<(i64, i64)>,
    pub starred_by: Option<UserId>,
}

impl ReleaseFindParameters {
    pub fn sorted(mut self, sort_method: ReleaseSortMethod) -> Self {
        self.sort_method = sort_method;
        self
    }

    pub fn in_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn in_clusters(mut self, clusters: Vec<ClusterId>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn in_media_library(mut self, media_library: MediaLibraryId) -> Self {
        self.media_library = Some(media_library);
        self
    }

    pub fn by_artist(mut self, artist: ArtistId) -> Self {
        self.artist = Some(artist);
        self
    }

    pub fn in_year_range(mut self, from: i64, to: i64) -> Self {
        self.year_range = Some((from, to));
        self
    }

    pub fn starred_by(mut self, user: UserId) -> Self {
        self.starred_by = Some(user);
        self
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &ReleaseFindParameters) {
    let mut clause = WhereClause::new();

    if !params.clusters.is_empty() {
        clause.push(qb);
        push_cluster_filter(
            qb,
            "r.id",
            "SELECT t.release_id AS eid, tc.cluster_id AS cid
             FROM track t
             INNER JOIN track_cluster tc ON tc.track_id = t.id
             WHERE t.release_id IS NOT NULL",
            &params.clusters,
        );
    }

    if let Some(media_library) = params.media_library {
        clause.push(qb);
        qb.push("EXISTS (SELECT 1 FROM track t WHERE t.release_id = r.id AND t.media_library_id = ");
        qb.push_bind(media_library);
        qb.push(")");
    }

    if let Some(artist) = params.artist {
        clause.push(qb);
        qb.push(
            "EXISTS (SELECT 1 FROM track t
             INNER JOIN track_artist_link tal ON tal.track_id = t.id
             WHERE t.release_id = r.id AND tal.artist_id = ",
        );
        qb.push_bind(artist);
        qb.push(")");
    }

    if let Some((from, to)) = params.year_range {
        clause.push(qb);
        qb.push("EXISTS (SELECT 1 FROM track t WHERE t.release_id = r.id AND t.year BETWEEN ");
        qb.push_bind(from);
        qb.push(" AND ");
        qb.push_bind(to);
        qb.push(")");
    }

    if let Some(user) = params.starred_by {
        clause.push(qb);
        qb.push("r.id IN (SELECT release_id FROM starred_release WHERE user_id = ");
        qb.push_bind(user);
        qb.push(")");
    }
}

/// Find release ids matching the parameters, read-only
pub async fn find_ids(
    conn: &mut SqliteConnection,
    params: &ReleaseFindParameters,
) -> Result<RangeResults<ReleaseId>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT r.id FROM \"release\" r");
    push_filters(&mut qb, params);

    match params.sort_method {
        ReleaseSortMethod::None => {}
        ReleaseSortMethod::Name => {
            qb.push(" ORDER BY r.name COLLATE NOCASE");
        }
        ReleaseSortMethod::ArtistNameThenName => {
            qb.push(" ORDER BY r.artist_display_name COLLATE NOCASE, r.name COLLATE NOCASE");
        }
        ReleaseSortMethod::DateAsc => {
            qb.push(" ORDER BY (SELECT MIN(t.year) FROM track t WHERE t.release_id = r.id), r.name COLLATE NOCASE");
        }
        ReleaseSortMethod::DateDesc => {
            qb.push(" ORDER BY (SELECT MIN(t.year) FROM track t WHERE t.release_id = r.id) DESC, r.name COLLATE NOCASE");
        }
        ReleaseSortMethod::LastWritten => {
            qb.push(" ORDER BY (SELECT MAX(t.file_last_write) FROM track t WHERE t.release_id = r.id) DESC");
        }
        ReleaseSortMethod::Random => {
            qb.push(" ORDER BY RANDOM()");
        }
    }

    push_range(&mut qb, params.range);

    let ids: Vec<ReleaseId> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(RangeResults::from_rows(ids, params.range))
}

/// Count matching releases without materializing ids
pub async fn count(conn: &mut SqliteConnection, params: &ReleaseFindParameters) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM \"release\" r");
    push_filters(&mut qb, params);

    let total: i64 = qb.build_query_scalar().fetch_one(&mut *conn).await?;
    Ok(total)
}
