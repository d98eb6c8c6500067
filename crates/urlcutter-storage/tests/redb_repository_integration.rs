use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;
use urlcutter_core::ShortCode;
use urlcutter_storage::{ReadRepository, RedbRepository, Repository, StorageError};

struct Fixture {
    dir: TempDir,
    repo: RedbRepository,
}

impl Fixture {
    fn start() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = RedbRepository::open(dir.path().join("urlcutter.db")).expect("open store");
        Self { dir, repo }
    }

    fn reopen(self) -> Self {
        let Fixture { dir, repo } = self;
        repo.close().expect("close store");
        let repo = RedbRepository::open(dir.path().join("urlcutter.db")).expect("reopen store");
        Self { dir, repo }
    }
}

#[tokio::test]
async fn insert_and_lookup_round_trip() {
    let fixture = Fixture::start();

    let code = fixture.repo.insert("http://example.com").await.unwrap();

    let record = fixture.repo.get(&code).await.unwrap();
    assert_eq!(record.key, code);
    assert_eq!(record.target_url, "http://example.com");
}

#[tokio::test]
async fn sequential_inserts_issue_gapless_codes() {
    let fixture = Fixture::start();

    let mut issued = Vec::new();
    for i in 0..100 {
        let code = fixture
            .repo
            .insert(&format!("http://example.com/{i}"))
            .await
            .unwrap();
        issued.push(code.id().unwrap());
    }

    assert_eq!(issued, (1..=100).collect::<Vec<u64>>());
    assert_eq!(fixture.repo.current_sequence().unwrap(), 100);
}

#[tokio::test]
async fn lookup_of_never_issued_code_is_not_found() {
    let fixture = Fixture::start();
    fixture.repo.insert("http://example.com").await.unwrap();

    let err = fixture
        .repo
        .get(&ShortCode::parse("68go").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::NotFound(ref code) if code == "68go"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_issue_distinct_codes() {
    const WRITERS: usize = 64;

    let fixture = Fixture::start();
    let repo = Arc::new(fixture.repo);

    let mut handles = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            let url = format!("http://example.com/{i}");
            let code = repo.insert(&url).await.unwrap();
            (code, url)
        }));
    }

    let mut issued = Vec::with_capacity(WRITERS);
    for handle in handles {
        issued.push(handle.await.unwrap());
    }

    let ids: HashSet<u64> = issued.iter().map(|(code, _)| code.id().unwrap()).collect();
    assert_eq!(ids, (1..=WRITERS as u64).collect::<HashSet<_>>());

    for (code, url) in &issued {
        let record = repo.get(code).await.unwrap();
        assert_eq!(&record.target_url, url);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_partial_inserts() {
    let fixture = Fixture::start();
    let repo = Arc::new(fixture.repo);
    let first = repo.insert("http://example.com/0").await.unwrap();

    let writer = {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            for i in 1..50 {
                repo.insert(&format!("http://example.com/{i}")).await.unwrap();
            }
        })
    };

    let reader = {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            for _ in 0..200 {
                let record = repo.get(&first).await.unwrap();
                assert_eq!(record.target_url, "http://example.com/0");

                match repo.get(&ShortCode::generated(50)).await {
                    Ok(record) => assert_eq!(record.target_url, "http://example.com/49"),
                    Err(StorageError::NotFound(_)) => {}
                    Err(err) => panic!("unexpected lookup error: {err}"),
                }
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}

#[tokio::test]
async fn records_and_counter_survive_reopen() {
    let fixture = Fixture::start();
    let code = fixture.repo.insert("http://example.com").await.unwrap();

    let fixture = fixture.reopen();

    let record = fixture.repo.get(&code).await.unwrap();
    assert_eq!(record.target_url, "http://example.com");

    let next = fixture.repo.insert("http://example.org").await.unwrap();
    assert_eq!(next.id().unwrap(), code.id().unwrap() + 1);
}

#[tokio::test]
async fn reopen_without_inserts_keeps_collection_missing() {
    let fixture = Fixture::start().reopen();

    let err = fixture
        .repo
        .get(&ShortCode::generated(1))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::CollectionMissing(_)));
}

#[test]
fn second_open_of_a_live_file_fails() {
    let fixture = Fixture::start();

    let err = RedbRepository::open(fixture.repo.path()).unwrap_err();
    assert!(matches!(err, StorageError::Open(_)));
}
