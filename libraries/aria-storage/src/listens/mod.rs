//! Listen history
//!
//! Append-only play log plus the derived most/recently played listings. All
//! listings are user scoped and paginated the same way as the find queries.

use crate::error::Result;
use crate::query::{Range, RangeResults};
use aria_core::{ArtistId, Listen, ReleaseId, TrackId, UserId};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

pub async fn record(
    conn: &mut SqliteConnection,
    user: UserId,
    track: TrackId,
    listened_at: i64,
) -> Result<Listen> {
    let result =
        sqlx::query("INSERT INTO listen (user_id, track_id, listened_at) VALUES (?, ?, ?)")
            .bind(user)
            .bind(track)
            .bind(listened_at)
            .execute(&mut *conn)
            .await?;

    Ok(Listen {
        id: result.last_insert_rowid(),
        user_id: user,
        track_id: track,
        listened_at,
    })
}

pub async fn count_for_user(conn: &mut SqliteConnection, user: UserId) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listen WHERE user_id = ?")
        .bind(user)
        .fetch_one(&mut *conn)
        .await?;

    Ok(total)
}

async fn fetch_page(
    conn: &mut SqliteConnection,
    mut qb: QueryBuilder<'_, Sqlite>,
    range: Option<Range>,
) -> Result<RangeResults<i64>> {
    crate::query::push_range(&mut qb, range);
    let ids: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(RangeResults::from_rows(ids, range))
}

/// Tracks ordered by play count, ties broken by most recent listen
pub async fn most_played_track_ids(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<TrackId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT l.track_id FROM listen l WHERE l.user_id = ",
    );
    qb.push_bind(user);
    qb.push(" GROUP BY l.track_id ORDER BY COUNT(*) DESC, MAX(l.listened_at) DESC");

    fetch_page(conn, qb, range).await
}

/// Tracks ordered by most recent listen
pub async fn recently_played_track_ids(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<TrackId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT l.track_id FROM listen l WHERE l.user_id = ",
    );
    qb.push_bind(user);
    qb.push(" GROUP BY l.track_id ORDER BY MAX(l.listened_at) DESC");

    fetch_page(conn, qb, range).await
}

/// Releases ordered by play count over their tracks
pub async fn most_played_release_ids(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<ReleaseId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT t.release_id FROM listen l
         INNER JOIN track t ON t.id = l.track_id
         WHERE t.release_id IS NOT NULL AND l.user_id = ",
    );
    qb.push_bind(user);
    qb.push(" GROUP BY t.release_id ORDER BY COUNT(*) DESC, MAX(l.listened_at) DESC");

    fetch_page(conn, qb, range).await
}

/// Releases ordered by most recent listen over their tracks
pub async fn recently_played_release_ids(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<ReleaseId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT t.release_id FROM listen l
         INNER JOIN track t ON t.id = l.track_id
         WHERE t.release_id IS NOT NULL AND l.user_id = ",
    );
    qb.push_bind(user);
    qb.push(" GROUP BY t.release_id ORDER BY MAX(l.listened_at) DESC");

    fetch_page(conn, qb, range).await
}

/// Artists ordered by play count over their linked tracks
pub async fn most_played_artist_ids(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<ArtistId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT tal.artist_id FROM listen l
         INNER JOIN track_artist_link tal ON tal.track_id = l.track_id
         WHERE l.user_id = ",
    );
    qb.push_bind(user);
    qb.push(" GROUP BY tal.artist_id ORDER BY COUNT(*) DESC, MAX(l.listened_at) DESC");

    fetch_page(conn, qb, range).await
}

/// Artists ordered by most recent listen over their linked tracks
pub async fn recently_played_artist_ids(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<ArtistId>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT tal.artist_id FROM listen l
         INNER JOIN track_artist_link tal ON tal.track_id = l.track_id
         WHERE l.user_id = ",
    );
    qb.push_bind(user);
    qb.push(" GROUP BY tal.artist_id ORDER BY MAX(l.listened_at) DESC");

    fetch_page(conn, qb, range).await
}

/// Recent listen rows for a user, newest first
pub async fn list_for_user(
    conn: &mut SqliteConnection,
    user: UserId,
    range: Option<Range>,
) -> Result<RangeResults<Listen>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, user_id, track_id, listened_at FROM listen WHERE user_id = ",
    );
    qb.push_bind(user);
    qb.push(" ORDER BY listened_at DESC, id DESC");
    crate::query::push_range(&mut qb, range);

    let rows = qb.build().fetch_all(&mut *conn).await?;
    let listens = rows
        .iter()
        .map(|row| Listen {
            id: row.get("id"),
            user_id: row.get("user_id"),
            track_id: row.get("track_id"),
            listened_at: row.get("listened_at"),
        })
        .collect();

    Ok(RangeResults::from_rows(listens, range))
}
