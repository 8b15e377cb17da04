//! Artist types

use serde::{Deserialize, Serialize};

pub type ArtistId = i64;

/// An artist
///
/// At most one row exists per external identifier (MBID), and reuse of
/// identifier-less rows is by exact name only. The two populations never
/// merge automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub sort_name: String,
    pub mbid: Option<String>,
}

/// Data for creating a new artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtist {
    pub name: String,
    pub sort_name: String,
    pub mbid: Option<String>,
}

/// Role of an artist on a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtistLinkType {
    Primary,
    Composer,
    Conductor,
    Lyricist,
    Mixer,
    Performer,
    Producer,
    Remixer,
}

impl ArtistLinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Composer => "composer",
            Self::Conductor => "conductor",
            Self::Lyricist => "lyricist",
            Self::Mixer => "mixer",
            Self::Performer => "performer",
            Self::Producer => "producer",
            Self::Remixer => "remixer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(Self::Primary),
            "composer" => Some(Self::Composer),
            "conductor" => Some(Self::Conductor),
            "lyricist" => Some(Self::Lyricist),
            "mixer" => Some(Self::Mixer),
            "performer" => Some(Self::Performer),
            "producer" => Some(Self::Producer),
            "remixer" => Some(Self::Remixer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_type_round_trip() {
        for link_type in [
            ArtistLinkType::Primary,
            ArtistLinkType::Composer,
            ArtistLinkType::Conductor,
            ArtistLinkType::Lyricist,
            ArtistLinkType::Mixer,
            ArtistLinkType::Performer,
            ArtistLinkType::Producer,
            ArtistLinkType::Remixer,
        ] {
            assert_eq!(ArtistLinkType::from_str(link_type.as_str()), Some(link_type));
        }
        assert_eq!(ArtistLinkType::from_str("unknown"), None);
    }
}
