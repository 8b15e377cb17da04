//! User and listen types
//!
//! Consumed by out-of-scope feedback/scrobbling services; the index only
//! needs their identifiers for query filtering and ordering.

use super::TrackId;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ListenId = i64;

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// A single play of a track, recorded by the listen-tracking collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listen {
    pub id: ListenId,
    pub user_id: UserId,
    pub track_id: TrackId,
    /// Unix seconds
    pub listened_at: i64,
}
