//! Domain types

mod artist;
mod cluster;
mod library;
mod release;
mod track;
mod user;

pub use artist::{Artist, ArtistId, ArtistLinkType, CreateArtist};
pub use cluster::{Cluster, ClusterId, ClusterType, ClusterTypeId};
pub use library::{MediaLibrary, MediaLibraryId};
pub use release::{CreateRelease, Release, ReleaseId};
pub use track::{CreateTrack, Track, TrackId};
pub use user::{Listen, ListenId, User, UserId};
