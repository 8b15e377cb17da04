//! Cluster indexing
//!
//! Projects the parsed tag dimensions of one track onto cluster rows and
//! membership links. Existing links are replaced wholesale; empty clusters
//! left behind are swept by post-scan maintenance.

use aria_core::TrackId;
use aria_storage::clusters;
use sqlx::SqliteConnection;
use std::collections::BTreeMap;

pub(crate) async fn index_track(
    conn: &mut SqliteConnection,
    track: TrackId,
    tags: &BTreeMap<String, Vec<String>>,
) -> aria_storage::Result<()> {
    clusters::clear_track_links(conn, track).await?;

    for (dimension, values) in tags {
        if values.is_empty() {
            continue;
        }
        let cluster_type = clusters::get_or_create_type(conn, dimension).await?;
        for value in values {
            let cluster = clusters::get_or_create(conn, cluster_type.id, value).await?;
            clusters::link_track(conn, track, cluster.id).await?;
        }
    }

    Ok(())
}
