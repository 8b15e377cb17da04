//! Integration tests for the migration manager
//!
//! Covers version monotonicity, resuming an interrupted chain, the semantic
//! data conversion in version 3 and the fatal outdated-binary check.


use aria_storage::migrations::{self, CURRENT_DB_VERSION};
use aria_storage::{settings, StorageError};
use test_helpers::TestDb;

#[tokio::test]
async fn test_fresh_database_migrates_to_current_version() {
    let mut db = TestDb::empty().await;

    migrations::migrate(&mut db.session)
        .await
        .expect("Failed to migrate");

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    let version = migrations::stored_version(tx.conn())
        .await
        .expect("Failed to read version");
    assert_eq!(version, Some(CURRENT_DB_VERSION));
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let mut db = TestDb::new().await;

    migrations::migrate(&mut db.session)
        .await
        .expect("Second migrate must be a no-op");

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    let version = migrations::stored_version(tx.conn())
        .await
        .expect("Failed to read version");
    assert_eq!(version, Some(CURRENT_DB_VERSION));
}

#[tokio::test]
async fn test_resumes_from_intermediate_version() {
    let mut db = TestDb::empty().await;

    migrations::migrate_up_to(&mut db.session, 2)
        .await
        .expect("Failed to migrate to version 2");

    {
        let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
        let version = migrations::stored_version(tx.conn())
            .await
            .expect("Failed to read version");
        assert_eq!(version, Some(2));
    }

    migrations::migrate(&mut db.session)
        .await
        .expect("Failed to resume migration");

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    let version = migrations::stored_version(tx.conn())
        .await
        .expect("Failed to read version");
    assert_eq!(version, Some(CURRENT_DB_VERSION));
}

#[tokio::test]
async fn test_duration_conversion_bumps_scan_version() {
    let mut db = TestDb::empty().await;

    migrations::migrate_up_to(&mut db.session, 2)
        .await
        .expect("Failed to migrate to version 2");

    // Seed a pre-conversion row holding seconds in the duration column
    {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        sqlx::query("INSERT INTO media_library (name, root_path) VALUES ('m', '/m')")
            .execute(tx.conn())
            .await
            .expect("Failed to insert library");
        sqlx::query(
            "INSERT INTO track (file_path, file_last_write, file_added, name, duration, media_library_id)
             VALUES ('/m/a.flac', 1, 1, 'a', 3, 1)",
        )
        .execute(tx.conn())
        .await
        .expect("Failed to insert track");
        tx.commit().await.expect("Failed to commit");
    }

    migrations::migrate(&mut db.session)
        .await
        .expect("Failed to finish migration");

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    let duration_ms: i64 = sqlx::query_scalar("SELECT duration_ms FROM track WHERE name = 'a'")
        .fetch_one(tx.conn())
        .await
        .expect("Failed to read converted duration");
    assert_eq!(duration_ms, 3000);

    let scan_settings = settings::get(tx.conn())
        .await
        .expect("Failed to read settings");
    assert_eq!(
        scan_settings.scan_version, 1,
        "data-changing step must force a rescan"
    );
}

#[tokio::test]
async fn test_scan_settings_round_trip() {
    let mut db = TestDb::new().await;

    {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        settings::set_extra_tags(tx.conn(), &["ALBUMGROUPING".to_string()])
            .await
            .expect("Failed to set extra tags");
        let bumped = settings::bump_scan_version(tx.conn())
            .await
            .expect("Failed to bump scan version");
        assert_eq!(bumped, 2, "fresh chain ends at 1, bump makes 2");
        tx.commit().await.expect("Failed to commit");
    }

    let mut tx = db.session.read_tx().await.expect("Failed to open read tx");
    let scan_settings = settings::get(tx.conn())
        .await
        .expect("Failed to read settings");
    assert_eq!(scan_settings.scan_version, 2);
    assert_eq!(scan_settings.extra_tags, vec!["ALBUMGROUPING".to_string()]);
}

#[tokio::test]
async fn test_newer_database_is_rejected() {
    let mut db = TestDb::new().await;

    {
        let mut tx = db.session.write_tx().await.expect("Failed to open write tx");
        sqlx::query("UPDATE version_info SET db_version = ?")
            .bind(CURRENT_DB_VERSION + 1)
            .execute(tx.conn())
            .await
            .expect("Failed to fake a newer version");
        tx.commit().await.expect("Failed to commit");
    }

    let err = migrations::migrate(&mut db.session)
        .await
        .expect_err("A newer database must be rejected");
    assert!(matches!(err, StorageError::BinaryOutdated { .. }));
}
