use std::sync::Arc;

use bytes::Bytes;
use object_store::ObjectStore;
use object_store::memory::InMemory;
use tempfile::TempDir;

use mycoder::application::ports::{FileStore, FileStoreError, LibraryStore, LibraryStoreError};
use mycoder::domain::{ChatId, sanitize_file_name};
use mycoder::infrastructure::storage::{JsonLibraryStore, LocalFileStore, TempUpload};

fn library(dir: &TempDir) -> JsonLibraryStore {
    let blobs: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    JsonLibraryStore::new(dir.path().join("data").join("library.json"), blobs).unwrap()
}

#[test]
fn given_declared_paths_when_sanitizing_file_names_then_basename_kept() {
    assert_eq!(sanitize_file_name("../../etc/passwd"), Some("passwd".to_string()));
    assert_eq!(sanitize_file_name("C:\\Users\\me\\notes.txt"), Some("notes.txt".to_string()));
    assert_eq!(sanitize_file_name(".."), None);
    assert_eq!(sanitize_file_name("dir/"), None);
}

#[test]
fn given_chat_ids_when_parsing_then_only_safe_ids_accepted() {
    assert!(ChatId::parse("chat_2024-01").is_ok());
    assert!(ChatId::parse("").is_err());
    assert!(ChatId::parse("a/b").is_err());
    assert!(ChatId::parse(&"x".repeat(129)).is_err());
}

#[tokio::test]
async fn given_saved_files_when_listing_chat_then_sorted_with_sizes() {
    let dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(dir.path().to_path_buf()).unwrap();
    let chat = ChatId::parse("c1").unwrap();

    store.save_file(&chat, "b.txt", Bytes::from_static(b"bb")).await.unwrap();
    store.save_file(&chat, "a.txt", Bytes::from_static(b"a")).await.unwrap();

    let files = store.list_files(&chat).await.unwrap();
    let listed: Vec<(&str, u64)> = files.iter().map(|f| (f.name.as_str(), f.size)).collect();
    assert_eq!(listed, vec![("a.txt", 1), ("b.txt", 2)]);
}

#[tokio::test]
async fn given_reserved_characters_in_name_when_listing_reading_deleting_then_name_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(dir.path().to_path_buf()).unwrap();
    let chat = ChatId::parse("c1").unwrap();
    store
        .save_file(&chat, "notes[1] #2 50%.txt", Bytes::from_static(b"body"))
        .await
        .unwrap();

    let files = store.list_files(&chat).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "notes[1] #2 50%.txt");
    assert_eq!(store.read_file(&files[0].path).await.unwrap(), b"body");

    store.delete_file(&chat, &files[0].name).await.unwrap();
    assert!(store.list_files(&chat).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_existing_name_when_saving_again_then_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(dir.path().to_path_buf()).unwrap();
    let chat = ChatId::parse("c1").unwrap();

    store.save_file(&chat, "a.txt", Bytes::from_static(b"old")).await.unwrap();
    let stored = store
        .save_file(&chat, "a.txt", Bytes::from_static(b"newer"))
        .await
        .unwrap();

    assert_eq!(store.read_file(&stored.path).await.unwrap(), b"newer");
    assert_eq!(store.list_files(&chat).await.unwrap().len(), 1);
}

#[tokio::test]
async fn given_unknown_chat_when_listing_then_empty() {
    let dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(dir.path().to_path_buf()).unwrap();

    let files = store.list_files(&ChatId::parse("nobody").unwrap()).await.unwrap();

    assert!(files.is_empty());
}

#[tokio::test]
async fn given_chat_files_when_deleting_then_missing_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let store = LocalFileStore::new(dir.path().to_path_buf()).unwrap();
    let chat = ChatId::parse("c1").unwrap();
    store.save_file(&chat, "a.txt", Bytes::from_static(b"a")).await.unwrap();

    store.delete_file(&chat, "a.txt").await.unwrap();
    let again = store.delete_file(&chat, "a.txt").await;
    let invalid = store.delete_file(&chat, "..").await;

    assert!(matches!(again, Err(FileStoreError::NotFound(_))));
    assert!(matches!(invalid, Err(FileStoreError::InvalidName(_))));
}

#[tokio::test]
async fn given_missing_index_when_listing_library_then_empty() {
    let dir = TempDir::new().unwrap();

    let entries = library(&dir).list_entries().await.unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn given_added_entry_when_reading_back_then_content_and_index_persist() {
    let dir = TempDir::new().unwrap();
    let store = library(&dir);

    let entry = store
        .add("../slides.pdf", "course", Bytes::from_static(b"%PDF-1.4"))
        .await
        .unwrap();

    assert_eq!(entry.filename, "slides.pdf");
    assert_eq!(entry.size, 8);
    assert_eq!(store.read_content(&entry).await.unwrap(), Some(b"%PDF-1.4".to_vec()));
    let raw = std::fs::read_to_string(dir.path().join("data").join("library.json")).unwrap();
    assert!(raw.contains("\"storedName\""));
    assert!(raw.contains("\"uploadedAt\""));
    assert!(!dir.path().join("data").join("library.json.tmp").exists());
}

#[tokio::test]
async fn given_entry_when_pinning_and_deleting_then_index_updated() {
    let dir = TempDir::new().unwrap();
    let store = library(&dir);
    let entry = store.add("a.txt", "default", Bytes::from_static(b"a")).await.unwrap();

    let pinned = store.set_pinned(&entry.id, true).await.unwrap().unwrap();
    assert!(pinned.pinned);
    assert!(store.get(&entry.id).await.unwrap().unwrap().pinned);
    assert!(store.set_pinned("missing", true).await.unwrap().is_none());

    assert!(store.delete(&entry.id).await.unwrap());
    assert!(!store.delete(&entry.id).await.unwrap());
    assert_eq!(store.read_content(&entry).await.unwrap(), None);
}

#[tokio::test]
async fn given_concurrent_adds_when_complete_then_no_entry_lost() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(library(&dir));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store
                .add(&format!("f{i}.txt"), "default", Bytes::from_static(b"x"))
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.list_entries().await.unwrap().len(), 8);
}

#[tokio::test]
async fn given_corrupt_index_when_listing_then_index_corrupted() {
    let dir = TempDir::new().unwrap();
    let store = library(&dir);
    std::fs::write(dir.path().join("data").join("library.json"), "{not json").unwrap();

    let result = store.list_entries().await;

    assert!(matches!(result, Err(LibraryStoreError::IndexCorrupted(_))));
}

#[tokio::test]
async fn given_spooled_upload_when_dropped_then_file_removed() {
    let dir = TempDir::new().unwrap();

    let upload = TempUpload::spool(
        &dir.path().join("tmp"),
        "task.txt".to_string(),
        Some("text/plain".to_string()),
        Bytes::from_static(b"spooled bytes"),
    )
    .await
    .unwrap();
    let path = upload.path().to_path_buf();

    assert_eq!(std::fs::read(&path).unwrap(), b"spooled bytes");
    assert_eq!(upload.upload().name, "task.txt");
    drop(upload);
    assert!(!path.exists());
}
