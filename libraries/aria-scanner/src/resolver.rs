//! Entity resolution
//!
//! Maps parsed artist/release credits onto existing rows or creates new
//! ones. External identifiers partition each population: an identified row
//! is only ever matched by identifier, an identifier-less row only by exact
//! name, and a name is reused only when it is unambiguous (exactly one
//! candidate). Ambiguity always creates a fresh row rather than guessing.

use aria_core::{Artist, CreateArtist, CreateRelease, Release};
use aria_metadata::{ParsedArtist, ParsedRelease};
use aria_storage::{artists, releases};
use sqlx::SqliteConnection;

pub(crate) async fn resolve_artist(
    conn: &mut SqliteConnection,
    parsed: &ParsedArtist,
) -> aria_storage::Result<Artist> {
    let sort_name = parsed.sort_name.clone().unwrap_or_else(|| parsed.name.clone());

    if let Some(mbid) = &parsed.mbid {
        if let Some(existing) = artists::find_by_mbid(conn, mbid).await? {
            // Tags are the freshest spelling for an identified artist
            if existing.name != parsed.name || existing.sort_name != sort_name {
                artists::update_name(conn, existing.id, &parsed.name, &sort_name).await?;
            }
            return Ok(Artist {
                name: parsed.name.clone(),
                sort_name,
                ..existing
            });
        }
        return artists::create(
            conn,
            CreateArtist {
                name: parsed.name.clone(),
                sort_name,
                mbid: Some(mbid.clone()),
            },
        )
        .await;
    }

    let mut candidates = artists::find_by_name_without_mbid(conn, &parsed.name).await?;
    if candidates.len() == 1 {
        return Ok(candidates.remove(0));
    }

    artists::create(
        conn,
        CreateArtist {
            name: parsed.name.clone(),
            sort_name,
            mbid: None,
        },
    )
    .await
}

pub(crate) async fn resolve_release(
    conn: &mut SqliteConnection,
    parsed: &ParsedRelease,
) -> aria_storage::Result<Release> {
    let artist_display_name = parsed.artist_display_name.clone().unwrap_or_default();

    if let Some(mbid) = &parsed.mbid {
        if let Some(existing) = releases::find_by_mbid(conn, mbid).await? {
            if existing.name != parsed.name || existing.artist_display_name != artist_display_name
            {
                releases::update_name(conn, existing.id, &parsed.name, &artist_display_name)
                    .await?;
            }
            return Ok(Release {
                name: parsed.name.clone(),
                artist_display_name,
                ..existing
            });
        }
        return releases::create(
            conn,
            CreateRelease {
                name: parsed.name.clone(),
                mbid: Some(mbid.clone()),
                release_type: parsed.release_type.clone(),
                artist_display_name,
            },
        )
        .await;
    }

    let mut candidates = releases::find_by_name_without_mbid(conn, &parsed.name).await?;
    if candidates.len() == 1 {
        return Ok(candidates.remove(0));
    }

    releases::create(
        conn,
        CreateRelease {
            name: parsed.name.clone(),
            mbid: None,
            release_type: parsed.release_type.clone(),
            artist_display_name,
        },
    )
    .await
}
