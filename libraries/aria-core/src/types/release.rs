//! Release types

use serde::{Deserialize, Serialize};

pub type ReleaseId = i64;

/// A release (album, single, compilation...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    pub name: String,
    pub mbid: Option<String>,
    pub release_type: Option<String>,
    /// Denormalized artist display string for fast listing
    pub artist_display_name: String,
    /// Cached counts, recomputed by post-scan maintenance
    pub medium_count: i64,
    pub track_count: i64,
}

/// Data for creating a new release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelease {
    pub name: String,
    pub mbid: Option<String>,
    pub release_type: Option<String>,
    pub artist_display_name: String,
}
