//! Integration tests for media library registration and removal


use aria_storage::lyrics::{self, CreateLyricsFile};
use aria_storage::{media_libraries, tracks};
use test_helpers::{create_test_library, create_test_track, track_fixture, TestDb};

#[tokio::test]
async fn test_remove_library_drops_indexed_content() {
    let mut db = TestDb::new().await;
    let library = create_test_library(&mut db.session).await;
    let track_id =
        create_test_track(&mut db.session, &track_fixture("a", "/music/a.flac", library.id)).await;

    {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        lyrics::upsert(
            tx.conn(),
            &CreateLyricsFile {
                file_path: "/music/a.lrc".to_string(),
                file_last_write: 1,
                scan_version: 0,
                file_stem: "a".to_string(),
                directory: "/music".to_string(),
            },
        )
        .await
        .expect("Failed to index lyrics");
        tx.commit().await.expect("Failed to commit");
    }

    {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        media_libraries::remove(tx.conn(), library.id)
            .await
            .expect("Removing a library that still owns tracks must succeed");
        tx.commit().await.expect("Failed to commit");
    }

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    assert!(media_libraries::get_by_id(tx.conn(), library.id)
        .await
        .expect("Failed to query library")
        .is_none());
    assert!(tracks::get_by_id(tx.conn(), track_id)
        .await
        .expect("Failed to query track")
        .is_none());
    assert!(lyrics::get_by_path(tx.conn(), "/music/a.lrc")
        .await
        .expect("Failed to query lyrics")
        .is_none());
}

#[tokio::test]
async fn test_remove_library_keeps_other_roots_intact() {
    let mut db = TestDb::new().await;
    let first = create_test_library(&mut db.session).await;
    let second = {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        let library = media_libraries::create(tx.conn(), "Other", "/other")
            .await
            .expect("Failed to create library");
        tx.commit().await.expect("Failed to commit");
        library
    };

    create_test_track(&mut db.session, &track_fixture("a", "/music/a.flac", first.id)).await;
    let kept =
        create_test_track(&mut db.session, &track_fixture("b", "/other/b.flac", second.id)).await;

    {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        media_libraries::remove(tx.conn(), first.id)
            .await
            .expect("Failed to remove library");
        tx.commit().await.expect("Failed to commit");
    }

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    assert!(media_libraries::get_by_id(tx.conn(), second.id)
        .await
        .expect("Failed to query library")
        .is_some());
    assert!(tracks::get_by_id(tx.conn(), kept)
        .await
        .expect("Failed to query track")
        .is_some());
}

#[tokio::test]
async fn test_remove_unknown_library_is_a_no_op() {
    let mut db = TestDb::new().await;

    let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
    media_libraries::remove(tx.conn(), 42)
        .await
        .expect("Removing an unknown id must not fail");
}
