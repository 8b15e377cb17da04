//! Track types

use super::{MediaLibraryId, ReleaseId};
use serde::{Deserialize, Serialize};

pub type TrackId = i64;

/// An indexed track
///
/// Snapshot of the embedded tags plus the file facts used for change
/// detection (`file_last_write`, `scan_version`). Timestamps are unix
/// seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub file_path: String,
    pub file_last_write: i64,
    pub file_added: i64,
    pub scan_version: i64,
    pub name: String,
    pub duration_ms: i64,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub date: Option<String>,
    pub original_date: Option<String>,
    pub year: Option<i64>,
    pub bitrate: Option<i64>,
    pub rating: Option<i64>,
    pub has_cover: bool,
    pub track_replay_gain: Option<f64>,
    pub release_replay_gain: Option<f64>,
    pub copyright: Option<String>,
    pub recording_mbid: Option<String>,
    pub release_id: Option<ReleaseId>,
    pub media_library_id: MediaLibraryId,
}

/// Data for creating or refreshing a track row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrack {
    pub file_path: String,
    pub file_last_write: i64,
    pub scan_version: i64,
    pub name: String,
    pub duration_ms: i64,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub date: Option<String>,
    pub original_date: Option<String>,
    pub year: Option<i64>,
    pub bitrate: Option<i64>,
    pub rating: Option<i64>,
    pub has_cover: bool,
    pub track_replay_gain: Option<f64>,
    pub release_replay_gain: Option<f64>,
    pub copyright: Option<String>,
    pub recording_mbid: Option<String>,
    pub release_id: Option<ReleaseId>,
    pub media_library_id: MediaLibraryId,
}
