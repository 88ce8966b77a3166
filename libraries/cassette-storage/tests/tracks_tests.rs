//! Integration tests for the SQLite track store
//!
//! Tests track table operations including:
//! - Store-assigned ids and load order
//! - Reset destroying records and schema metadata
//! - Persistence across reopen
//! - Read/write error classification


use cassette_core::{CassetteError, TrackStore};
use cassette_storage::SqliteTrackStore;
use test_helpers::*;

#[tokio::test]
async fn test_insert_assigns_sequential_ids() {
    let db = TestDb::new().await;

    let first = db.store.insert(&new_track("song1.mp3")).await.unwrap();
    let second = db.store.insert(&new_track("song2.mp3")).await.unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[tokio::test]
async fn test_list_all_returns_insertion_order() {
    let db = TestDb::new().await;

    for name in ["b.mp3", "a.mp3", "c.ogg"] {
        db.store.insert(&new_track(name)).await.unwrap();
    }

    let tracks = db.store.list_all().await.unwrap();
    let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["b.mp3", "a.mp3", "c.ogg"]);

    let ids: Vec<_> = tracks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_encoded_audio_survives_storage() {
    let db = TestDb::new().await;
    let track = new_track("song1.mp3");
    let expected = track.encoded_audio.clone();

    db.store.insert(&track).await.unwrap();

    let stored = db.store.list_all().await.unwrap();
    assert_eq!(stored[0].encoded_audio, expected);

    let (mime, bytes) = stored[0].encoded_audio.decode().unwrap();
    assert_eq!(mime, "audio/mpeg");
    assert_eq!(bytes, b"bytes of song1.mp3");
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let db = TestDb::new().await;
    assert!(db.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_empties_store_and_restarts_ids() {
    let db = TestDb::new().await;
    db.store.insert(&new_track("song1.mp3")).await.unwrap();
    db.store.insert(&new_track("song2.mp3")).await.unwrap();

    db.store.reset().await.unwrap();

    assert!(db.store.list_all().await.unwrap().is_empty());
    let id = db.store.insert(&new_track("song3.mp3")).await.unwrap();
    assert_eq!(id, 1, "ids restart after schema is dropped");
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let db = TestDb::new().await;

    db.store.reset().await.unwrap();
    db.store.reset().await.unwrap();

    assert!(db.store.list_all().await.unwrap().is_empty());
    db.store.insert(&new_track("song1.mp3")).await.unwrap();
    assert_eq!(db.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_records_persist_across_reopen() {
    let db = TestDb::new().await;
    db.store.insert(&new_track("song1.mp3")).await.unwrap();
    db.store.pool().close().await;

    let reopened = SqliteTrackStore::open(&db.url).await.unwrap();
    let tracks = reopened.list_all().await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "song1.mp3");
}

#[tokio::test]
async fn test_in_memory_database_keeps_its_connection() {
    let store = SqliteTrackStore::open("sqlite::memory:").await.unwrap();

    store.insert(&new_track("song1.mp3")).await.unwrap();
    store.insert(&new_track("song2.mp3")).await.unwrap();

    assert_eq!(store.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_write_to_closed_pool_is_storage_write_error() {
    let db = TestDb::new().await;
    db.store.pool().close().await;

    let err = db.store.insert(&new_track("song1.mp3")).await.unwrap_err();
    assert!(matches!(err, CassetteError::StorageWrite(_)));
}

#[tokio::test]
async fn test_read_from_closed_pool_is_storage_read_error() {
    let db = TestDb::new().await;
    db.store.pool().close().await;

    let err = db.store.list_all().await.unwrap_err();
    assert!(matches!(err, CassetteError::StorageRead(_)));
}
