//! Normalized track record

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An artist credit extracted from tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedArtist {
    pub name: String,
    pub sort_name: Option<String>,
    pub mbid: Option<String>,
}

impl ParsedArtist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_name: None,
            mbid: None,
        }
    }
}

/// A performer credit, optionally with an instrument/subrole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPerformer {
    pub name: String,
    pub subrole: Option<String>,
}

/// Release information extracted from tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedRelease {
    pub name: String,
    pub mbid: Option<String>,
    pub release_type: Option<String>,
    pub artist_display_name: Option<String>,
}

/// Normalized record for one media file
///
/// Tag dimensions used for clustering (GENRE, MOOD, ... plus user-configured
/// extra names) are exposed through `tags`, already split into individual
/// values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedTrack {
    pub title: Option<String>,
    pub artist_display_name: Option<String>,
    /// Primary artists, in credit order
    pub artists: Vec<ParsedArtist>,
    pub composers: Vec<String>,
    pub conductors: Vec<String>,
    pub lyricists: Vec<String>,
    pub mixers: Vec<String>,
    pub performers: Vec<ParsedPerformer>,
    pub producers: Vec<String>,
    pub remixers: Vec<String>,
    pub release: Option<ParsedRelease>,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub duration_ms: i64,
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
    /// Tag dimension name -> individual values
    pub tags: BTreeMap<String, Vec<String>>,
}

/// Split multi-valued tag text into individual values
pub(crate) fn split_tag_values(text: &str) -> Vec<String> {
    text.split(&[',', ';', '/'][..])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
