//! Tracks
//!
//! Central slice of the index: file facts for change detection, the tag
//! snapshot, artist links and the find/count query surface.

use crate::error::{Result, StorageError};
use crate::query::{push_cluster_filter, push_range, Range, RangeResults, WhereClause};
use aria_core::{
    ArtistId, ArtistLinkType, ClusterId, CreateTrack, MediaLibraryId, ReleaseId, Track, TrackId,
    UserId,
};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

const COLUMNS: &str = "id, file_path, file_last_write, file_added, scan_version, name, \
     duration_ms, track_number, disc_number, date, original_date, year, bitrate, rating, \
     has_cover, track_replay_gain, release_replay_gain, copyright, recording_mbid, \
     release_id, media_library_id";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Track {
    Track {
        id: row.get("id"),
        file_path: row.get("file_path"),
        file_last_write: row.get("file_last_write"),
        file_added: row.get("file_added"),
        scan_version: row.get("scan_version"),
        name: row.get("name"),
        duration_ms: row.get("duration_ms"),
        track_number: row.get("track_number"),
        disc_number: row.get("disc_number"),
        date: row.get("date"),
        original_date: row.get("original_date"),
        year: row.get("year"),
        bitrate: row.get("bitrate"),
        rating: row.get("rating"),
        has_cover: row.get("has_cover"),
        track_replay_gain: row.get("track_replay_gain"),
        release_replay_gain: row.get("release_replay_gain"),
        copyright: row.get("copyright"),
        recording_mbid: row.get("recording_mbid"),
        release_id: row.get("release_id"),
        media_library_id: row.get("media_library_id"),
    }
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM track WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Lookup by absolute file path, the change-detection entry point
pub async fn get_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM track WHERE file_path = ?"))
        .bind(file_path)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Insert a new track; `file_added` is stamped by the caller, once
pub async fn create(
    conn: &mut SqliteConnection,
    track: &CreateTrack,
    file_added: i64,
) -> Result<TrackId> {
    let result = sqlx::query(
        "INSERT INTO track (file_path, file_last_write, file_added, scan_version, name,
            duration_ms, track_number, disc_number, date, original_date, year, bitrate,
            rating, has_cover, track_replay_gain, release_replay_gain, copyright,
            recording_mbid, release_id, media_library_id)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&track.file_path)
    .bind(track.file_last_write)
    .bind(file_added)
    .bind(track.scan_version)
    .bind(&track.name)
    .bind(track.duration_ms)
    .bind(track.track_number)
    .bind(track.disc_number)
    .bind(&track.date)
    .bind(&track.original_date)
    .bind(track.year)
    .bind(track.bitrate)
    .bind(track.rating)
    .bind(track.has_cover)
    .bind(track.track_replay_gain)
    .bind(track.release_replay_gain)
    .bind(&track.copyright)
    .bind(&track.recording_mbid)
    .bind(track.release_id)
    .bind(track.media_library_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Refresh an existing row from a rescan; `file_added` is preserved
pub async fn update(conn: &mut SqliteConnection, id: TrackId, track: &CreateTrack) -> Result<()> {
    let result = sqlx::query(
        "UPDATE track SET file_path = ?, file_last_write = ?, scan_version = ?, name = ?,
            duration_ms = ?, track_number = ?, disc_number = ?, date = ?, original_date = ?,
            year = ?, bitrate = ?, rating = ?, has_cover = ?, track_replay_gain = ?,
            release_replay_gain = ?, copyright = ?, recording_mbid = ?, release_id = ?,
            media_library_id = ?
         WHERE id = ?",
    )
    .bind(&track.file_path)
    .bind(track.file_last_write)
    .bind(track.scan_version)
    .bind(&track.name)
    .bind(track.duration_ms)
    .bind(track.track_number)
    .bind(track.disc_number)
    .bind(&track.date)
    .bind(&track.original_date)
    .bind(track.year)
    .bind(track.bitrate)
    .bind(track.rating)
    .bind(track.has_cover)
    .bind(track.track_replay_gain)
    .bind(track.release_replay_gain)
    .bind(&track.copyright)
    .bind(&track.recording_mbid)
    .bind(track.release_id)
    .bind(track.media_library_id)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Track", id));
    }
    Ok(())
}

pub async fn remove(conn: &mut SqliteConnection, id: TrackId) -> Result<()> {
    sqlx::query("DELETE FROM track WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn remove_by_path(conn: &mut SqliteConnection, file_path: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM track WHERE file_path = ?")
        .bind(file_path)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All indexed paths under a media library, for the removed-file sweep
pub async fn list_paths(
    conn: &mut SqliteConnection,
    media_library: MediaLibraryId,
) -> Result<Vec<(TrackId, String)>> {
    let rows = sqlx::query("SELECT id, file_path FROM track WHERE media_library_id = ?")
        .bind(media_library)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("id"), row.get("file_path")))
        .collect())
}

pub async fn clear_artist_links(conn: &mut SqliteConnection, track: TrackId) -> Result<()> {
    sqlx::query("DELETE FROM track_artist_link WHERE track_id = ?")
        .bind(track)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn add_artist_link(
    conn: &mut SqliteConnection,
    track: TrackId,
    artist: ArtistId,
    link_type: ArtistLinkType,
    subrole: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO track_artist_link (track_id, artist_id, link_type, subrole)
         VALUES (?, ?, ?, ?)",
    )
    .bind(track)
    .bind(artist)
    .bind(link_type.as_str())
    .bind(subrole)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Linked artist ids for a track, optionally narrowed to one link type
pub async fn get_artist_links(
    conn: &mut SqliteConnection,
    track: TrackId,
    link_type: Option<ArtistLinkType>,
) -> Result<Vec<ArtistId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT artist_id FROM track_artist_link WHERE track_id = ",
    );
    qb.push_bind(track);
    if let Some(link_type) = link_type {
        qb.push(" AND link_type = ");
        qb.push_bind(link_type.as_str());
    }
    qb.push(" ORDER BY rowid");

    let ids: Vec<ArtistId> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(ids)
}

/// Sort order for track listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackSortMethod {
    /// Store order
    #[default]
    None,
    Id,
    Name,
    /// Most recently modified files first
    LastWritten,
    /// Most recently indexed files first
    Added,
    /// Newest date first, tracks of one release kept together in play order
    DateDescAndRelease,
    /// Play order within a release (disc, then track number)
    Release,
    Random,
}

/// Query parameters for track find/count
///
/// Defaults: store order, unbounded range, no filters.
#[derive(Debug, Clone, Default)]
pub struct TrackFindParameters {
    pub sort_method: TrackSortMethod,
    pub range: Option<Range>,
    /// Result must be a member of all of these clusters
    pub clusters: Vec<ClusterId>,
    pub media_library: Option<MediaLibraryId>,
    pub release: Option<ReleaseId>,
    pub artist: Option<ArtistId>,
    /// Restricts the artist filter to these link types; empty means any
    pub link_types: Vec<ArtistLinkType>,
    pub starred_by: Option<UserId>,
    /// Only files modified strictly after this unix timestamp
    pub written_after: Option<i64>,
    /// Inclusive year bounds
    pub year_range: Option<(i64, i64)>,
}

impl TrackFindParameters {
    pub fn sorted(mut self, sort_method: TrackSortMethod) -> Self {
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

    pub fn in_release(mut self, release: ReleaseId) -> Self {
        self.release = Some(release);
        self
    }

    pub fn by_artist(mut self, artist: ArtistId) -> Self {
        self.artist = Some(artist);
        self
    }

    pub fn with_link_types(mut self, link_types: Vec<ArtistLinkType>) -> Self {
        self.link_types = link_types;
        self
    }

    pub fn starred_by(mut self, user: UserId) -> Self {
        self.starred_by = Some(user);
        self
    }

    pub fn written_after(mut self, unix_seconds: i64) -> Self {
        self.written_after = Some(unix_seconds);
        self
    }

    pub fn in_year_range(mut self, from: i64, to: i64) -> Self {
        self.year_range = Some((from, to));
        self
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, params: &TrackFindParameters) {
    let mut clause = WhereClause::new();

    if !params.clusters.is_empty() {
        clause.push(qb);
        push_cluster_filter(
            qb,
            "t.id",
            "SELECT tc.track_id AS eid, tc.cluster_id AS cid FROM track_cluster tc",
            &params.clusters,
        );
    }

    if let Some(media_library) = params.media_library {
        clause.push(qb);
        qb.push("t.media_library_id = ");
        qb.push_bind(media_library);
    }

    if let Some(release) = params.release {
        clause.push(qb);
        qb.push("t.release_id = ");
        qb.push_bind(release);
    }

    if let Some(artist) = params.artist {
        clause.push(qb);
        qb.push("EXISTS (SELECT 1 FROM track_artist_link tal WHERE tal.track_id = t.id AND tal.artist_id = ");
        qb.push_bind(artist);
        if !params.link_types.is_empty() {
            qb.push(" AND tal.link_type IN (");
            let mut separated = qb.separated(", ");
            for link_type in &params.link_types {
                separated.push_bind(link_type.as_str());
            }
            qb.push(")");
        }
        qb.push(")");
    }

    if let Some(user) = params.starred_by {
        clause.push(qb);
        qb.push("t.id IN (SELECT track_id FROM starred_track WHERE user_id = ");
        qb.push_bind(user);
        qb.push(")");
    }

    if let Some(written_after) = params.written_after {
        clause.push(qb);
        qb.push("t.file_last_write > ");
        qb.push_bind(written_after);
    }

    if let Some((from, to)) = params.year_range {
        clause.push(qb);
        qb.push("t.year BETWEEN ");
        qb.push_bind(from);
        qb.push(" AND ");
        qb.push_bind(to);
    }
}

/// Find track ids matching the parameters, read-only
pub async fn find_ids(
    conn: &mut SqliteConnection,
    params: &TrackFindParameters,
) -> Result<RangeResults<TrackId>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT t.id FROM track t");
    push_filters(&mut qb, params);

    match params.sort_method {
        TrackSortMethod::None => {}
        TrackSortMethod::Id => {
            qb.push(" ORDER BY t.id");
        }
        TrackSortMethod::Name => {
            qb.push(" ORDER BY t.name COLLATE NOCASE");
        }
        TrackSortMethod::LastWritten => {
            qb.push(" ORDER BY t.file_last_write DESC");
        }
        TrackSortMethod::Added => {
            qb.push(" ORDER BY t.file_added DESC");
        }
        TrackSortMethod::DateDescAndRelease => {
            qb.push(
                " ORDER BY COALESCE(t.date, CAST(t.year AS TEXT)) DESC, t.release_id, \
                 t.disc_number, t.track_number",
            );
        }
        TrackSortMethod::Release => {
            qb.push(" ORDER BY t.disc_number, t.track_number");
        }
        TrackSortMethod::Random => {
            qb.push(" ORDER BY RANDOM()");
        }
    }

    push_range(&mut qb, params.range);

    let ids: Vec<TrackId> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(RangeResults::from_rows(ids, params.range))
}

/// Count matching tracks without materializing ids
pub async fn count(conn: &mut SqliteConnection, params: &TrackFindParameters) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM track t");
    push_filters(&mut qb, params);

    let total: i64 = qb.build_query_scalar().fetch_one(&mut *conn).await?;
    Ok(total)
}
