use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use mycoder::application::services::{
    Candidates, ContextAssembler, ContextRequest, TRUNCATION_MARKER, fit_to_budget,
};
use mycoder::domain::{ChatId, ContextPart, ContextSource, SourceFlags, UploadedFile};

use crate::common::{CannedFileLoader, Stores, TEST_BUDGET_FLOOR, stores};

fn assembler(stores: &Stores, loader: CannedFileLoader) -> ContextAssembler {
    ContextAssembler::new(
        Arc::clone(&stores.file_store),
        Arc::clone(&stores.library_store),
        Arc::new(loader),
        TEST_BUDGET_FLOOR,
    )
}

async fn upload(dir: &Path, name: &str) -> UploadedFile {
    let path = dir.join(format!("spooled-{name}"));
    tokio::fs::write(&path, b"raw upload bytes").await.unwrap();
    UploadedFile {
        name: name.to_string(),
        media_type: Some("text/plain".to_string()),
        path,
    }
}

fn request<'a>(
    chat_id: Option<&'a ChatId>,
    uploads: &'a [UploadedFile],
    pinned_ids: &'a [String],
    char_budget: usize,
) -> ContextRequest<'a> {
    ContextRequest {
        chat_id,
        uploads,
        sources: SourceFlags::all(),
        pinned_ids,
        char_budget,
        persist_uploads: false,
    }
}

#[tokio::test]
async fn given_all_sources_when_assembling_then_parts_follow_upload_chat_library_order() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let chat_id = ChatId::parse("chat-1").unwrap();
    stores
        .file_store
        .save_file(&chat_id, "history.txt", Bytes::from_static(b"x"))
        .await
        .unwrap();
    let entry = stores
        .library_store
        .add("slides.txt", "default", Bytes::from_static(b"x"))
        .await
        .unwrap();
    stores.library_store.set_pinned(&entry.id, true).await.unwrap();
    let uploads = vec![upload(dir.path(), "task.txt").await];
    let assembler = assembler(
        &stores,
        CannedFileLoader::new(&[
            ("task.txt", "the task"),
            ("history.txt", "earlier notes"),
            ("slides.txt", "lecture slides"),
        ]),
    );

    let bundle = assembler
        .assemble(&request(Some(&chat_id), &uploads, &[], 48_000))
        .await;

    let order: Vec<(ContextSource, &str)> = bundle
        .parts
        .iter()
        .map(|p| (p.source, p.name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (ContextSource::Upload, "task.txt"),
            (ContextSource::Chat, "history.txt"),
            (ContextSource::Library, "slides.txt"),
        ]
    );
    assert_eq!(bundle.candidate_count, 3);
    assert!(bundle.concatenated_text.contains("--- UPLOAD: task.txt ---\nthe task"));
    assert!(bundle.concatenated_text.contains("--- CHAT FILE: history.txt ---"));
    assert!(bundle.concatenated_text.contains("--- LIBRARY: slides.txt ---"));
}

#[tokio::test]
async fn given_ten_thousand_char_upload_and_five_thousand_budget_when_assembling_then_truncates_once() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let long_text = "a".repeat(10_000);
    let uploads = vec![upload(dir.path(), "big.txt").await];
    let assembler = assembler(&stores, CannedFileLoader::new(&[("big.txt", long_text.as_str())]));

    let bundle = assembler.assemble(&request(None, &uploads, &[], 5_000)).await;

    assert_eq!(bundle.parts.len(), 1);
    let part = &bundle.parts[0];
    assert!(part.text.ends_with(TRUNCATION_MARKER));
    assert_eq!(
        part.text.chars().count(),
        5_000 + TRUNCATION_MARKER.chars().count()
    );
}

#[tokio::test]
async fn given_budget_below_floor_when_assembling_then_floor_applies() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let long_text = "b".repeat(3_000);
    let uploads = vec![upload(dir.path(), "big.txt").await];
    let assembler = assembler(&stores, CannedFileLoader::new(&[("big.txt", long_text.as_str())]));

    let bundle = assembler.assemble(&request(None, &uploads, &[], 10)).await;

    let kept = bundle.parts[0].text.trim_end_matches(TRUNCATION_MARKER);
    assert_eq!(kept.chars().count(), TEST_BUDGET_FLOOR);
}

#[tokio::test]
async fn given_unreadable_upload_when_assembling_then_skipped_but_counted() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let uploads = vec![
        upload(dir.path(), "broken.bin").await,
        upload(dir.path(), "ok.txt").await,
    ];
    let assembler = assembler(&stores, CannedFileLoader::new(&[("ok.txt", "fine")]));

    let bundle = assembler.assemble(&request(None, &uploads, &[], 12_000)).await;

    assert_eq!(bundle.parts.len(), 1);
    assert_eq!(bundle.parts[0].name, "ok.txt");
    assert_eq!(bundle.candidate_count, 2);
}

#[tokio::test]
async fn given_blank_extraction_when_assembling_then_part_excluded() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let uploads = vec![upload(dir.path(), "blank.txt").await];
    let assembler = assembler(&stores, CannedFileLoader::new(&[("blank.txt", "  \n\t ")]));

    let bundle = assembler.assemble(&request(None, &uploads, &[], 12_000)).await;

    assert!(bundle.is_empty());
    assert!(bundle.parts.is_empty());
    assert_eq!(bundle.candidate_count, 1);
}

#[tokio::test]
async fn given_persisted_upload_when_assembling_then_saved_to_chat_and_counted_once() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let chat_id = ChatId::parse("chat-2").unwrap();
    let uploads = vec![upload(dir.path(), "notes.txt").await];
    let assembler = assembler(&stores, CannedFileLoader::new(&[("notes.txt", "my notes")]));

    let bundle = assembler
        .assemble(&ContextRequest {
            persist_uploads: true,
            ..request(Some(&chat_id), &uploads, &[], 12_000)
        })
        .await;

    let saved = stores.file_store.list_files(&chat_id).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "notes.txt");
    assert_eq!(bundle.parts.len(), 1);
    assert_eq!(bundle.parts[0].source, ContextSource::Upload);
    assert_eq!(bundle.candidate_count, 1);
}

#[tokio::test]
async fn given_upload_name_with_reserved_characters_when_persisted_then_counted_once_and_read_next_turn() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let chat_id = ChatId::parse("chat-3").unwrap();
    let uploads = vec![upload(dir.path(), "notes[1] #2.txt").await];
    let assembler = assembler(
        &stores,
        CannedFileLoader::new(&[("notes[1] #2.txt", "bracketed notes")]),
    );

    let first = assembler
        .assemble(&ContextRequest {
            persist_uploads: true,
            ..request(Some(&chat_id), &uploads, &[], 12_000)
        })
        .await;
    let next_turn = assembler
        .assemble(&request(Some(&chat_id), &[], &[], 12_000))
        .await;

    assert_eq!(first.candidate_count, 1);
    assert_eq!(first.parts.len(), 1);
    assert_eq!(next_turn.candidate_count, 1);
    assert_eq!(next_turn.parts.len(), 1);
    assert_eq!(next_turn.parts[0].source, ContextSource::Chat);
    assert_eq!(next_turn.parts[0].name, "notes[1] #2.txt");
    assert_eq!(next_turn.parts[0].text, "bracketed notes");
}

#[tokio::test]
async fn given_all_sources_disabled_when_assembling_then_bundle_is_empty() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let uploads = vec![upload(dir.path(), "task.txt").await];
    let assembler = assembler(&stores, CannedFileLoader::new(&[("task.txt", "the task")]));

    let bundle = assembler
        .assemble(&ContextRequest {
            sources: SourceFlags {
                uploads: false,
                chat: false,
                library: false,
            },
            ..request(None, &uploads, &[], 12_000)
        })
        .await;

    assert!(bundle.is_empty());
    assert_eq!(bundle.candidate_count, 0);
}

#[tokio::test]
async fn given_explicitly_selected_library_entry_when_assembling_then_only_selected_included() {
    let dir = TempDir::new().unwrap();
    let stores = stores(dir.path());
    let picked = stores
        .library_store
        .add("picked.txt", "default", Bytes::from_static(b"x"))
        .await
        .unwrap();
    stores
        .library_store
        .add("ignored.txt", "default", Bytes::from_static(b"x"))
        .await
        .unwrap();
    let assembler = assembler(
        &stores,
        CannedFileLoader::new(&[("picked.txt", "picked"), ("ignored.txt", "ignored")]),
    );
    let pinned_ids = vec![picked.id.clone()];

    let bundle = assembler
        .assemble(&request(None, &[], &pinned_ids, 12_000))
        .await;

    assert_eq!(bundle.parts.len(), 1);
    assert_eq!(bundle.parts[0].name, "picked.txt");
    assert_eq!(bundle.candidate_count, 1);
}

#[test]
fn given_parts_exceeding_budget_when_fitting_then_later_parts_dropped_and_invariant_holds() {
    let candidates = Candidates {
        parts: vec![
            ContextPart::new(ContextSource::Upload, "a.txt", "a".repeat(1_500)),
            ContextPart::new(ContextSource::Chat, "b.txt", "b".repeat(1_500)),
            ContextPart::new(ContextSource::Library, "c.txt", "c".repeat(1_500)),
        ],
        considered: 3,
    };

    let bundle = fit_to_budget(candidates, 2_000);

    assert_eq!(bundle.parts.len(), 2);
    assert_eq!(bundle.parts[0].text.chars().count(), 1_500);
    assert_eq!(
        bundle.parts[1].text,
        format!("{}{}", "b".repeat(500), TRUNCATION_MARKER)
    );
    assert!(bundle.text_chars() <= 2_000 + TRUNCATION_MARKER.chars().count());
    assert_eq!(bundle.candidate_count, 3);
}

#[test]
fn given_exact_fit_when_fitting_then_no_marker_and_nothing_after() {
    let candidates = Candidates {
        parts: vec![
            ContextPart::new(ContextSource::Upload, "a.txt", "a".repeat(2_000)),
            ContextPart::new(ContextSource::Chat, "b.txt", "b".to_string()),
        ],
        considered: 2,
    };

    let bundle = fit_to_budget(candidates, 2_000);

    assert_eq!(bundle.parts.len(), 1);
    assert!(!bundle.parts[0].text.ends_with(TRUNCATION_MARKER));
}
