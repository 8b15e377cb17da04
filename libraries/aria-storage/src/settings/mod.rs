//! Scan settings singleton
//!
//! Holds the scan version counter (bumping it forces re-evaluation of every
//! file on the next scan without deleting data) and the user-configured
//! extra tag names indexed as cluster dimensions.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    pub scan_version: i64,
    pub extra_tags: Vec<String>,
}

pub async fn get(conn: &mut SqliteConnection) -> Result<ScanSettings> {
    let row = sqlx::query("SELECT scan_version, extra_tags FROM scan_settings WHERE id = 1")
        .fetch_one(&mut *conn)
        .await?;

    let extra_tags: Vec<String> = serde_json::from_str(row.get::<&str, _>("extra_tags"))?;

    Ok(ScanSettings {
        scan_version: row.get("scan_version"),
        extra_tags,
    })
}

/// Increment the scan version, forcing a full rescan on the next run
pub async fn bump_scan_version(conn: &mut SqliteConnection) -> Result<i64> {
    sqlx::query("UPDATE scan_settings SET scan_version = scan_version + 1")
        .execute(&mut *conn)
        .await?;

    let version: i64 = sqlx::query_scalar("SELECT scan_version FROM scan_settings WHERE id = 1")
        .fetch_one(&mut *conn)
        .await?;

    Ok(version)
}

pub async fn set_extra_tags(conn: &mut SqliteConnection, extra_tags: &[String]) -> Result<()> {
    let encoded = serde_json::to_string(extra_tags)?;
    sqlx::query("UPDATE scan_settings SET extra_tags = ?")
        .bind(encoded)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
