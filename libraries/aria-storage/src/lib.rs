//! Aria Storage
//!
//! `SQLite` relational layer for the media index.
//!
//! # Architecture
//!
//! - **Vertical slicing**: each entity kind owns its queries in its module
//! - **Explicit transactions**: all access goes through [`Session`] guards
//! - **Generic query engine**: per-entity `FindParameters` with sorting,
//!   cluster filtering and limit+1 pagination
//!
//! # Example
//!
//! ```rust,no_run
//! use aria_storage::{create_pool, migrations, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://aria.db").await?;
//! let mut session = Session::new(pool);
//! migrations::migrate(&mut session).await?;
//!
//! let mut tx = session.read_tx().await?;
//! let params = aria_storage::tracks::TrackFindParameters::default();
//! let page = aria_storage::tracks::find_ids(tx.conn(), &params).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod query;
mod session;

pub mod migrations;

// Vertical slices
pub mod artists;
pub mod clusters;
pub mod images;
pub mod listens;
pub mod lyrics;
pub mod media_libraries;
pub mod playlists;
pub mod releases;
pub mod settings;
pub mod starred;
pub mod tracks;
pub mod users;

pub use error::{Result, StorageError};
pub use query::{Range, RangeResults};
pub use session::{ReadTransaction, Session, WriteTransaction};

use sqlx::sqlite::SqlitePool;

/// Create a new `SQLite` pool
///
/// WAL journal mode for concurrent readers against the single writer, a
/// busy timeout instead of immediate lock failures, foreign keys enforced.
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
