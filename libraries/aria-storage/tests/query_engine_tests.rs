//! Integration tests for the find/count query engine
//!
//! Covers sorting, limit+1 pagination, cluster AND filtering and the
//! per-entity filters across tracks, releases and artists.


use aria_core::{Artist, ArtistLinkType, ClusterId, MediaLibrary, Release, TrackId};
use aria_storage::artists::{ArtistFindParameters, ArtistSortMethod};
use aria_storage::releases::{ReleaseFindParameters, ReleaseSortMethod};
use aria_storage::tracks::{TrackFindParameters, TrackSortMethod};
use aria_storage::{artists, clusters, listens, releases, starred, tracks, users, Range};
use test_helpers::*;

struct Fixture {
    db: TestDb,
    library: MediaLibrary,
    alpha: Artist,
    beta: Artist,
    first: Release,
    second: Release,
    /// Aardvark, banana, Cherry, delta, Echo
    track_ids: [TrackId; 5],
    rock: ClusterId,
    metal: ClusterId,
}

async fn fixture() -> Fixture {
    let mut db = TestDb::new().await;
    let library = create_test_library(&mut db.session).await;
    let alpha = create_test_artist(&mut db.session, "Alpha", Some("mbid-alpha")).await;
    let beta = create_test_artist(&mut db.session, "beta", None).await;
    let first = create_test_release(&mut db.session, "First", Some("mbid-first")).await;
    let second = create_test_release(&mut db.session, "Second", None).await;

    let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
    let conn = tx.conn();

    let genre = clusters::get_or_create_type(conn, "GENRE")
        .await
        .expect("Failed to create cluster type");
    let rock = clusters::get_or_create(conn, genre.id, "Rock")
        .await
        .expect("Failed to create cluster")
        .id;
    let metal = clusters::get_or_create(conn, genre.id, "Metal")
        .await
        .expect("Failed to create cluster")
        .id;

    let rows: [(&str, Option<i64>, Option<i64>, i64, &Artist, &[ClusterId]); 5] = [
        ("Aardvark", Some(first.id), Some(2000), 100, &alpha, &[rock]),
        ("banana", Some(first.id), Some(2001), 200, &alpha, &[rock, metal]),
        ("Cherry", Some(second.id), Some(2010), 300, &beta, &[metal]),
        ("delta", Some(second.id), Some(2015), 400, &beta, &[rock, metal]),
        ("Echo", None, None, 500, &alpha, &[]),
    ];

    let mut track_ids = [0; 5];
    for (i, (name, release_id, year, last_write, artist, cluster_ids)) in
        rows.into_iter().enumerate()
    {
        let mut create = track_fixture(name, &format!("/music/{name}.flac"), library.id);
        create.release_id = release_id;
        create.year = year;
        create.file_last_write = last_write;

        let id = tracks::create(conn, &create, last_write)
            .await
            .expect("Failed to create track");
        tracks::add_artist_link(conn, id, artist.id, ArtistLinkType::Primary, None)
            .await
            .expect("Failed to link artist");
        for cluster_id in cluster_ids {
            clusters::link_track(conn, id, *cluster_id)
                .await
                .expect("Failed to link cluster");
        }
        track_ids[i] = id;
    }

    tx.commit().await.expect("Failed to commit fixture");

    Fixture {
        db,
        library,
        alpha,
        beta,
        first,
        second,
        track_ids,
        rock,
        metal,
    }
}

#[tokio::test]
async fn test_find_tracks_sorted_by_name_is_case_insensitive() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let params = TrackFindParameters::default().sorted(TrackSortMethod::Name);
    let page = tracks::find_ids(tx.conn(), &params)
        .await
        .expect("Failed to find tracks");

    assert_eq!(page.results, f.track_ids.to_vec());
    assert!(!page.more_results);
}

#[tokio::test]
async fn test_pagination_pages_are_disjoint_and_flag_more() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let sorted = TrackFindParameters::default().sorted(TrackSortMethod::Name);

    let page1 = tracks::find_ids(tx.conn(), &sorted.clone().in_range(Range::new(0, 2)))
        .await
        .expect("Failed to fetch page 1");
    assert_eq!(page1.results, vec![f.track_ids[0], f.track_ids[1]]);
    assert!(page1.more_results);

    let page2 = tracks::find_ids(tx.conn(), &sorted.clone().in_range(Range::new(2, 2)))
        .await
        .expect("Failed to fetch page 2");
    assert_eq!(page2.results, vec![f.track_ids[2], f.track_ids[3]]);
    assert!(page2.more_results);

    let page3 = tracks::find_ids(tx.conn(), &sorted.in_range(Range::new(4, 2)))
        .await
        .expect("Failed to fetch page 3");
    assert_eq!(page3.results, vec![f.track_ids[4]]);
    assert!(!page3.more_results);
}

#[tokio::test]
async fn test_cluster_filter_requires_membership_of_all_clusters() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let rock_only = TrackFindParameters::default()
        .sorted(TrackSortMethod::Id)
        .in_clusters(vec![f.rock]);
    let page = tracks::find_ids(tx.conn(), &rock_only)
        .await
        .expect("Failed to find rock tracks");
    assert_eq!(
        page.results,
        vec![f.track_ids[0], f.track_ids[1], f.track_ids[3]]
    );

    let both = TrackFindParameters::default()
        .sorted(TrackSortMethod::Id)
        .in_clusters(vec![f.rock, f.metal]);
    let page = tracks::find_ids(tx.conn(), &both)
        .await
        .expect("Failed to find rock+metal tracks");
    assert_eq!(page.results, vec![f.track_ids[1], f.track_ids[3]]);

    let total = tracks::count(tx.conn(), &both)
        .await
        .expect("Failed to count");
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_filter_by_artist_and_release() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let by_alpha = TrackFindParameters::default()
        .sorted(TrackSortMethod::Id)
        .by_artist(f.alpha.id);
    let page = tracks::find_ids(tx.conn(), &by_alpha)
        .await
        .expect("Failed to find by artist");
    assert_eq!(
        page.results,
        vec![f.track_ids[0], f.track_ids[1], f.track_ids[4]]
    );

    let on_second = TrackFindParameters::default()
        .sorted(TrackSortMethod::Id)
        .in_release(f.second.id);
    let page = tracks::find_ids(tx.conn(), &on_second)
        .await
        .expect("Failed to find by release");
    assert_eq!(page.results, vec![f.track_ids[2], f.track_ids[3]]);
}

#[tokio::test]
async fn test_written_after_filter() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let params = TrackFindParameters::default()
        .sorted(TrackSortMethod::Id)
        .written_after(250);
    let page = tracks::find_ids(tx.conn(), &params)
        .await
        .expect("Failed to find recent tracks");
    assert_eq!(
        page.results,
        vec![f.track_ids[2], f.track_ids[3], f.track_ids[4]]
    );
}

#[tokio::test]
async fn test_starred_filter() {
    let mut f = fixture().await;

    let user = {
        let mut tx = f.db.session.write_tx().await.expect("Failed to open write tx");
        let user = users::create(tx.conn(), "anna")
            .await
            .expect("Failed to create user");
        starred::star_track(tx.conn(), user.id, f.track_ids[2], 1000)
            .await
            .expect("Failed to star track");
        tx.commit().await.expect("Failed to commit");
        user
    };

    {
        let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");
        let params = TrackFindParameters::default().starred_by(user.id);
        let page = tracks::find_ids(tx.conn(), &params)
            .await
            .expect("Failed to find starred tracks");
        assert_eq!(page.results, vec![f.track_ids[2]]);
    }

    {
        let mut tx = f.db.session.write_tx().await.expect("Failed to open write tx");
        starred::unstar_track(tx.conn(), user.id, f.track_ids[2])
            .await
            .expect("Failed to unstar track");
        tx.commit().await.expect("Failed to commit");
    }

    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");
    let params = TrackFindParameters::default().starred_by(user.id);
    let page = tracks::find_ids(tx.conn(), &params)
        .await
        .expect("Failed to find starred tracks");
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_release_queries() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let by_alpha = ReleaseFindParameters::default().by_artist(f.alpha.id);
    let page = releases::find_ids(tx.conn(), &by_alpha)
        .await
        .expect("Failed to find releases by artist");
    assert_eq!(page.results, vec![f.first.id]);

    let by_date = ReleaseFindParameters::default().sorted(ReleaseSortMethod::DateAsc);
    let page = releases::find_ids(tx.conn(), &by_date)
        .await
        .expect("Failed to sort releases by date");
    assert_eq!(page.results, vec![f.first.id, f.second.id]);

    let recent = ReleaseFindParameters::default().in_year_range(2005, 2020);
    let page = releases::find_ids(tx.conn(), &recent)
        .await
        .expect("Failed to filter releases by year");
    assert_eq!(page.results, vec![f.second.id]);

    let total = releases::count(tx.conn(), &ReleaseFindParameters::default())
        .await
        .expect("Failed to count releases");
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_artist_queries() {
    let mut f = fixture().await;
    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let metal_artists = ArtistFindParameters::default()
        .sorted(ArtistSortMethod::Name)
        .in_clusters(vec![f.metal]);
    let page = artists::find_ids(tx.conn(), &metal_artists)
        .await
        .expect("Failed to find artists by cluster");
    assert_eq!(page.results, vec![f.alpha.id, f.beta.id]);

    let composers = ArtistFindParameters::default().with_link_type(ArtistLinkType::Composer);
    let page = artists::find_ids(tx.conn(), &composers)
        .await
        .expect("Failed to find composers");
    assert!(page.results.is_empty());

    let in_library = ArtistFindParameters::default()
        .sorted(ArtistSortMethod::SortName)
        .in_media_library(f.library.id);
    let total = artists::count(tx.conn(), &in_library)
        .await
        .expect("Failed to count artists");
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_listen_rankings() {
    let mut f = fixture().await;

    let user = {
        let mut tx = f.db.session.write_tx().await.expect("Failed to open write tx");
        let user = users::create(tx.conn(), "ben")
            .await
            .expect("Failed to create user");

        // Aardvark x3, Cherry x2 (latest), banana x1
        for (track, at) in [
            (f.track_ids[0], 10),
            (f.track_ids[0], 20),
            (f.track_ids[0], 30),
            (f.track_ids[2], 40),
            (f.track_ids[2], 60),
            (f.track_ids[1], 50),
        ] {
            listens::record(tx.conn(), user.id, track, at)
                .await
                .expect("Failed to record listen");
        }
        tx.commit().await.expect("Failed to commit");
        user
    };

    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");

    let most = listens::most_played_track_ids(tx.conn(), user.id, None)
        .await
        .expect("Failed to rank by play count");
    assert_eq!(
        most.results,
        vec![f.track_ids[0], f.track_ids[2], f.track_ids[1]]
    );

    let recent = listens::recently_played_track_ids(tx.conn(), user.id, Some(Range::new(0, 2)))
        .await
        .expect("Failed to rank by recency");
    assert_eq!(recent.results, vec![f.track_ids[2], f.track_ids[1]]);
    assert!(recent.more_results);
}

#[tokio::test]
async fn test_recompute_release_counts() {
    let mut f = fixture().await;

    {
        let mut tx = f.db.session.write_tx().await.expect("Failed to open write tx");
        releases::recompute_counts(tx.conn())
            .await
            .expect("Failed to recompute counts");
        tx.commit().await.expect("Failed to commit");
    }

    let mut tx = f.db.session.read_tx().await.expect("Failed to open read tx");
    let first = releases::get_by_id(tx.conn(), f.first.id)
        .await
        .expect("Failed to get release")
        .expect("Release must exist");
    assert_eq!(first.track_count, 2);
    assert_eq!(first.medium_count, 1);
}
