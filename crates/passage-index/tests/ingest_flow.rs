//! End-to-end ingestion: submit → job lifecycle → search.

use std::sync::Arc;
use std::time::Duration;

use passage_core::TenantId;
use passage_core::config::{ChunkingConfig, LimitsConfig};
use passage_index::retrieval::search_previews;
use passage_index::{IngestService, JobStatus, SubmittedFile, VectorIndex};
use passage_llm::hash::HashProvider;

fn service(dir: &std::path::Path) -> IngestService<HashProvider> {
    let index = Arc::new(VectorIndex::new(dir, HashProvider::default()));
    IngestService::new(
        dir,
        LimitsConfig {
            max_files_per_request: 3,
            max_file_mb: 5,
        },
        ChunkingConfig {
            max_tokens: 16,
            overlap: 2,
        },
        2,
        index,
    )
}

fn file(name: &str, content: &[u8]) -> SubmittedFile {
    SubmittedFile {
        filename: name.into(),
        content: content.to_vec(),
    }
}

async fn wait_terminal(
    svc: &IngestService<HashProvider>,
    job_id: &str,
) -> passage_index::JobSnapshot {
    for _ in 0..500 {
        let snap = svc.status(job_id).unwrap();
        if snap.status.is_terminal() {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}

#[tokio::test]
async fn successful_batch_reaches_done_and_is_searchable() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let tenant = TenantId::new("acme").unwrap();

    let body = "The quarterly report covers revenue growth and hiring plans. \
                It also details the eiusmod tempor initiative in depth.";
    let notes = "# Roadmap\nShip retrieval quality improvements.\n## Later\nEvaluate rerankers.";

    let job_id = svc
        .submit(
            &tenant,
            vec![
                file("report.txt", body.as_bytes()),
                file("roadmap.md", notes.as_bytes()),
            ],
        )
        .await
        .unwrap();

    let snap = wait_terminal(&svc, &job_id).await;
    assert_eq!(snap.status, JobStatus::Done);
    assert_eq!(snap.progress, 100);
    assert!(snap.error.is_none());
    assert_eq!(snap.tenant, tenant);
    assert_eq!(snap.files.len(), 2);

    assert!(svc.index().exists(&tenant));

    let previews = search_previews(svc.index(), &tenant, "tempor initiative", 5, 200)
        .await
        .unwrap();
    assert!(!previews.is_empty());
    for preview in &previews {
        assert!(preview.score > 0.0 && preview.score <= 1.0);
    }
}

#[tokio::test]
async fn failing_file_aborts_whole_batch() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let tenant = TenantId::new("acme").unwrap();

    // 0xFF 0xFE is not valid UTF-8, so loading B fails after A succeeded.
    let job_id = svc
        .submit(
            &tenant,
            vec![
                file("a.txt", b"first file is perfectly fine"),
                file("b.txt", &[0xFF, 0xFE, 0x00]),
                file("c.txt", b"never reached but also fine"),
            ],
        )
        .await
        .unwrap();

    let snap = wait_terminal(&svc, &job_id).await;
    assert_eq!(snap.status, JobStatus::Error);
    assert!(snap.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(snap.progress < 100);

    // Nothing from A or C was persisted.
    assert!(!svc.index().exists(&tenant));
}

#[tokio::test]
async fn jobs_for_different_tenants_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let t1 = TenantId::new("tenant-a").unwrap();
    let t2 = TenantId::new("tenant-b").unwrap();

    let j1 = svc
        .submit(&t1, vec![file("a.txt", b"alpha content here")])
        .await
        .unwrap();
    let j2 = svc
        .submit(&t2, vec![file("b.txt", b"beta content here")])
        .await
        .unwrap();

    let s1 = wait_terminal(&svc, &j1).await;
    let s2 = wait_terminal(&svc, &j2).await;
    assert_eq!(s1.status, JobStatus::Done);
    assert_eq!(s2.status, JobStatus::Done);
    assert!(svc.index().exists(&t1));
    assert!(svc.index().exists(&t2));
}

#[tokio::test]
async fn reset_clears_collection_and_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let tenant = TenantId::new("acme").unwrap();

    let job_id = svc
        .submit(&tenant, vec![file("doc.txt", b"some indexed content")])
        .await
        .unwrap();
    wait_terminal(&svc, &job_id).await;
    assert!(svc.index().exists(&tenant));
    assert!(dir.path().join("uploads/acme/doc.txt").exists());

    svc.reset(&tenant).await.unwrap();
    assert!(!svc.index().exists(&tenant));
    assert!(!dir.path().join("uploads/acme").exists());
}
