//! Media library types

use serde::{Deserialize, Serialize};

pub type MediaLibraryId = i64;

/// A configured library root; every track belongs to exactly one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaLibrary {
    pub id: MediaLibraryId,
    pub name: String,
    pub root_path: String,
}
