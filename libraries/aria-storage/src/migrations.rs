//! Schema migrations
//!
//! The persisted schema version lives in the `version_info` singleton and is
//! only ever written here. Steps are typed, ordered, applied strictly
//! sequentially (version N to N+1), each inside its own write transaction
//! that also persists the new version number, so a crash mid-chain resumes
//! from the last completed version on the next startup.
//!
//! A step that changes the semantic meaning of stored data (e.g. the
//! duration precision change in version 3) bumps the library scan version
//! to force a full rescan instead of trusting historical rows.

use crate::error::{Result, StorageError};
use crate::session::Session;
use sqlx::SqliteConnection;

/// Schema version this binary reads and writes
pub const CURRENT_DB_VERSION: i64 = 3;

/// Oldest stored version the step chain can still upgrade
pub const OLDEST_SUPPORTED_VERSION: i64 = 1;

struct MigrationStep {
    /// Version the database is at after this step
    version: i64,
    statements: &'static [&'static str],
    /// Force a full rescan because stored data changed meaning
    bump_scan_version: bool,
}

const MIGRATION_STEPS: &[MigrationStep] = &[
    MigrationStep {
        version: 1,
        statements: &[
            "CREATE TABLE version_info (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                db_version INTEGER NOT NULL
            )",
            "CREATE TABLE scan_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                scan_version INTEGER NOT NULL DEFAULT 0,
                extra_tags TEXT NOT NULL DEFAULT '[]'
            )",
            "INSERT INTO scan_settings (id, scan_version, extra_tags) VALUES (1, 0, '[]')",
            "CREATE TABLE media_library (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                root_path TEXT NOT NULL UNIQUE
            )",
            "CREATE TABLE artist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                sort_name TEXT NOT NULL,
                mbid TEXT UNIQUE
            )",
            "CREATE TABLE \"release\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                mbid TEXT UNIQUE,
                release_type TEXT,
                artist_display_name TEXT NOT NULL DEFAULT '',
                medium_count INTEGER NOT NULL DEFAULT 0,
                track_count INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE track (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL UNIQUE,
                file_last_write INTEGER NOT NULL,
                file_added INTEGER NOT NULL,
                scan_version INTEGER NOT NULL DEFAULT 0,
                name TEXT NOT NULL,
                duration INTEGER NOT NULL,
                track_number INTEGER,
                disc_number INTEGER,
                date TEXT,
                original_date TEXT,
                year INTEGER,
                bitrate INTEGER,
                has_cover INTEGER NOT NULL DEFAULT 0,
                track_replay_gain REAL,
                release_replay_gain REAL,
                recording_mbid TEXT,
                release_id INTEGER REFERENCES \"release\"(id),
                media_library_id INTEGER NOT NULL REFERENCES media_library(id)
            )",
            "CREATE INDEX idx_track_release ON track(release_id)",
            "CREATE INDEX idx_track_media_library ON track(media_library_id)",
            "CREATE TABLE track_artist_link (
                track_id INTEGER NOT NULL REFERENCES track(id) ON DELETE CASCADE,
                artist_id INTEGER NOT NULL REFERENCES artist(id),
                link_type TEXT NOT NULL,
                subrole TEXT,
                PRIMARY KEY (track_id, artist_id, link_type)
            )",
            "CREATE INDEX idx_track_artist_link_artist ON track_artist_link(artist_id)",
            "CREATE TABLE cluster_type (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
            "CREATE TABLE cluster (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cluster_type_id INTEGER NOT NULL REFERENCES cluster_type(id),
                name TEXT NOT NULL,
                track_count INTEGER NOT NULL DEFAULT 0,
                release_count INTEGER NOT NULL DEFAULT 0,
                UNIQUE (cluster_type_id, name)
            )",
            "CREATE TABLE track_cluster (
                track_id INTEGER NOT NULL REFERENCES track(id) ON DELETE CASCADE,
                cluster_id INTEGER NOT NULL REFERENCES cluster(id) ON DELETE CASCADE,
                PRIMARY KEY (track_id, cluster_id)
            )",
            "CREATE INDEX idx_track_cluster_cluster ON track_cluster(cluster_id)",
            "CREATE TABLE user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
            "CREATE TABLE listen (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                track_id INTEGER NOT NULL REFERENCES track(id) ON DELETE CASCADE,
                listened_at INTEGER NOT NULL
            )",
            "CREATE INDEX idx_listen_user_track ON listen(user_id, track_id)",
            "CREATE TABLE track_lyrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL UNIQUE,
                file_last_write INTEGER NOT NULL,
                scan_version INTEGER NOT NULL DEFAULT 0,
                file_stem TEXT NOT NULL,
                directory TEXT NOT NULL,
                track_id INTEGER REFERENCES track(id) ON DELETE SET NULL
            )",
            "CREATE TABLE image (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL UNIQUE,
                file_last_write INTEGER NOT NULL,
                scan_version INTEGER NOT NULL DEFAULT 0,
                file_stem TEXT NOT NULL,
                directory TEXT NOT NULL,
                is_cover INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE playlist_file (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL UNIQUE,
                file_last_write INTEGER NOT NULL,
                scan_version INTEGER NOT NULL DEFAULT 0,
                name TEXT NOT NULL,
                directory TEXT NOT NULL
            )",
            "CREATE TABLE playlist_file_entry (
                playlist_file_id INTEGER NOT NULL REFERENCES playlist_file(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                target_path TEXT NOT NULL,
                track_id INTEGER REFERENCES track(id) ON DELETE SET NULL,
                PRIMARY KEY (playlist_file_id, position)
            )",
            "CREATE INDEX idx_playlist_file_entry_track ON playlist_file_entry(track_id)",
        ],
        bump_scan_version: false,
    },
    MigrationStep {
        version: 2,
        statements: &[
            "ALTER TABLE track ADD COLUMN rating INTEGER",
            "ALTER TABLE track ADD COLUMN copyright TEXT",
            "CREATE TABLE starred_track (
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                track_id INTEGER NOT NULL REFERENCES track(id) ON DELETE CASCADE,
                starred_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, track_id)
            )",
            "CREATE TABLE starred_release (
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                release_id INTEGER NOT NULL REFERENCES \"release\"(id) ON DELETE CASCADE,
                starred_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, release_id)
            )",
            "CREATE TABLE starred_artist (
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                artist_id INTEGER NOT NULL REFERENCES artist(id) ON DELETE CASCADE,
                starred_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, artist_id)
            )",
        ],
        bump_scan_version: false,
    },
    MigrationStep {
        // Track durations move from second to millisecond precision;
        // historical rows are converted, the rescan refreshes them from tags
        version: 3,
        statements: &[
            "ALTER TABLE track RENAME COLUMN duration TO duration_ms",
            "UPDATE track SET duration_ms = duration_ms * 1000",
        ],
        bump_scan_version: true,
    },
];

/// Verify the step table covers `1..=CURRENT_DB_VERSION` with no gaps
fn check_contiguity() -> Result<()> {
    let mut expected = 1;
    for step in MIGRATION_STEPS {
        if step.version != expected {
            return Err(StorageError::MigrationGap {
                expected,
                found: step.version,
            });
        }
        expected += 1;
    }
    if expected != CURRENT_DB_VERSION + 1 {
        return Err(StorageError::MigrationGap {
            expected,
            found: CURRENT_DB_VERSION,
        });
    }
    Ok(())
}

/// Read the persisted schema version; `None` means a fresh database
pub async fn stored_version(conn: &mut SqliteConnection) -> Result<Option<i64>> {
    let table: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'version_info'",
    )
    .fetch_optional(&mut *conn)
    .await?;

    if table.is_none() {
        return Ok(None);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT db_version FROM version_info WHERE id = 1")
        .fetch_optional(&mut *conn)
        .await?;

    Ok(version)
}

/// Bring the schema forward to [`CURRENT_DB_VERSION`]
///
/// Fails fatally when the stored version is newer than this binary or older
/// than the oldest supported migration.
pub async fn migrate(session: &mut Session) -> Result<()> {
    migrate_up_to(session, CURRENT_DB_VERSION).await
}

/// Apply the chain up to `target` only; [`migrate`] is the normal entry
/// point, a bounded target exists for upgrade tooling and tests
pub async fn migrate_up_to(session: &mut Session, target: i64) -> Result<()> {
    check_contiguity()?;

    let version = {
        let mut tx = session.read_tx().await?;
        stored_version(tx.conn()).await?
    };

    if let Some(version) = version {
        if version > CURRENT_DB_VERSION {
            return Err(StorageError::BinaryOutdated {
                db_version: version,
                supported: CURRENT_DB_VERSION,
            });
        }
        if version < OLDEST_SUPPORTED_VERSION {
            return Err(StorageError::DatabaseOutdated {
                db_version: version,
                oldest_supported: OLDEST_SUPPORTED_VERSION,
            });
        }
    }

    let from = version.unwrap_or(0);
    for step in MIGRATION_STEPS
        .iter()
        .filter(|step| step.version > from && step.version <= target)
    {
        tracing::info!("migrating database to version {}", step.version);

        let mut tx = session.write_tx().await?;
        for statement in step.statements {
            sqlx::query(statement).execute(tx.conn()).await?;
        }
        if step.bump_scan_version {
            sqlx::query("UPDATE scan_settings SET scan_version = scan_version + 1")
                .execute(tx.conn())
                .await?;
        }
        sqlx::query(
            "INSERT INTO version_info (id, db_version) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET db_version = excluded.db_version",
        )
        .bind(step.version)
        .execute(tx.conn())
        .await?;
        tx.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_table_is_contiguous() {
        check_contiguity().expect("step table must cover 1..=CURRENT with no gaps");
    }
}
