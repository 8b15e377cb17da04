//! Aria Core
//!
//! Domain types shared by the index pipeline and the query layer.
//!
//! Every entity is identity-stable and integer-keyed; relationships are
//! foreign-key columns resolved by queries in the storage layer, never
//! in-memory object graphs.

#![forbid(unsafe_code)]

pub mod types;

pub use types::{
    Artist, ArtistId, ArtistLinkType, Cluster, ClusterId, ClusterType, ClusterTypeId,
    CreateArtist, CreateRelease, CreateTrack, Listen, ListenId, MediaLibrary, MediaLibraryId,
    Release, ReleaseId, Track, TrackId, User, UserId,
};
