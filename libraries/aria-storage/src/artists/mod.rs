//! Artists
//!
//! Lookup functions used by the entity resolver plus the generic
//! find/count query surface.

use crate::error::{Result, StorageError};
use crate::query::{push_cluster_filter, push_range, Range, RangeResults, WhereClause};
use aria_core::{Artist, ArtistId, ArtistLinkType, ClusterId, CreateArtist, MediaLibraryId, UserId};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

const COLUMNS: &str = "id, name, sort_name, mbid";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Artist {
    Artist {
        id: row.get("id"),
        name: row.get("name"),
        sort_name: row.get("sort_name"),
        mbid: row.get("mbid"),
    }
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM artist WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn find_by_mbid(conn: &mut SqliteConnection, mbid: &str) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM artist WHERE mbid = ?"))
        .bind(mbid)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Artists with this exact name that carry no external identifier
///
/// Identifier presence partitions the artist population; identifier-less
/// rows are only ever matched against identifier-less rows.
pub async fn find_by_name_without_mbid(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Vec<Artist>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM artist WHERE name = ? AND mbid IS NULL"
    ))
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn create(conn: &mut SqliteConnection, artist: CreateArtist) -> Result<Artist> {
    let result = sqlx::query("INSERT INTO artist (name, sort_name, mbid) VALUES (?, ?, ?)")
        .bind(&artist.name)
        .bind(&artist.sort_name)
        .bind(&artist.mbid)
        .execute(&mut *conn)
        .await?;

    let id = result.last_insert_rowid();
    get_by_id(conn, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Artist", id))
}

/// Refresh display/sort name, e.g. when a tagged file carries a newer
/// spelling for an identified artist
pub async fn update_name(
    conn: &mut SqliteConnection,
    id: ArtistId,
    name: &str,
    sort_name: &str,
) -> Result<()> {
    sqlx::query("UPDATE artist SET name = ?, sort_name = ? WHERE id = ?")
        .bind(name)
        .bind(sort_name)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Delete artists no track links reference anymore
pub async fn remove_orphans(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM artist
         WHERE id NOT IN (SELECT DISTINCT artist_id FROM track_artist_link)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Sort order for artist listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtistSortMethod {
    /// Store order
    #[default]
    None,
    Name,
    SortName,
    /// Artists with the most recently modified tracks first
    LastWritten,
    Random,
}

/// Query parameters for artist find/count
///
/// Defaults: store order, unbounded range, no filters.
#[derive(Debug, Clone, Default)]
pub struct ArtistFindParameters {
    pub sort_method: ArtistSortMethod,
    pub range: Option<Range>,
    /// Result must be a member of all of these clusters
    pub clusters: Vec<ClusterId>,
    pub media_library: Option<MediaLibraryId>,
    pub link_type: Option<ArtistLinkType>,
    pub starred_by: Option<UserId>,
}

impl ArtistFindParameters {
    pub fn sorted(mut self, sort_method: ArtistSortMethod) -> Self {
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

    pub fn with_link_type(mut self, link_type: ArtistLinkType) -> Self {
        self.link_type = Some(link_type);
        self
    }

    pub fn starred_by(mut self, user: UserId) -> Self {
        self.starred_by = Some(user);
        self
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &ArtistFindParameters) {
    let mut clause = WhereClause::new();

    if !params.clusters.is_empty() {
        clause.push(qb);
        push_cluster_filter(
            qb,
            "a.id",
            "SELECT tal.artist_id AS eid, tc.cluster_id AS cid
             FROM track_artist_link tal
             INNER JOIN track_cluster tc ON tc.track_id = tal.track_id",
            &params.clusters,
        );
    }

    if let Some(media_library) = params.media_library {
        clause.push(qb);
        qb.push(
            "EXISTS (SELECT 1 FROM track_artist_link tal
             INNER JOIN track t ON t.id = tal.track_id
             WHERE tal.artist_id = a.id AND t.media_library_id = ",
        );
        qb.push_bind(media_library);
        qb.push(")");
    }

    if let Some(link_type) = params.link_type {
        clause.push(qb);
        qb.push("EXISTS (SELECT 1 FROM track_artist_link tal WHERE tal.artist_id = a.id AND tal.link_type = ");
        qb.push_bind(link_type.as_str());
        qb.push(")");
    }

    if let Some(user) = params.starred_by {
        clause.push(qb);
        qb.push("a.id IN (SELECT artist_id FROM starred_artist WHERE user_id = ");
        qb.push_bind(user);
        qb.push(")");
    }
}

/// Find artist ids matching the parameters, read-only
pub async fn find_ids(
    conn: &mut SqliteConnection,
    params: &ArtistFindParameters,
) -> Result<RangeResults<ArtistId>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT a.id FROM artist a");
    push_filters(&mut qb, params);

    match params.sort_method {
        ArtistSortMethod::None => {}
        ArtistSortMethod::Name => {
            qb.push(" ORDER BY a.name COLLATE NOCASE");
        }
        ArtistSortMethod::SortName => {
            qb.push(" ORDER BY a.sort_name COLLATE NOCASE");
        }
        ArtistSortMethod::LastWritten => {
            qb.push(
                " ORDER BY (SELECT MAX(t.file_last_write) FROM track_artist_link tal
                 INNER JOIN track t ON t.id = tal.track_id
                 WHERE tal.artist_id = a.id) DESC",
            );
        }
        ArtistSortMethod::Random => {
            qb.push(" ORDER BY RANDOM()");
        }
    }

    push_range(&mut qb, params.range);

    let ids: Vec<ArtistId> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(RangeResults::from_rows(ids, params.range))
}

/// Count matching artists without materializing ids
pub async fn count(conn: &mut SqliteConnection, params: &ArtistFindParameters) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM artist a");
    push_filters(&mut qb, params);

    let total: i64 = qb.build_query_scalar().fetch_one(&mut *conn).await?;
    Ok(total)
}
