//! Concurrency laws of the registry core.
//!
//! The one correctness-critical contract: N concurrent resolutions of the
//! same id increase its access count by exactly N, with no lost updates and
//! no double counts, while distinct ids proceed independently.

use std::sync::Arc;

use redirectory::services::RedirectService;
use redirectory::storages::LinkStore;
use redirectory::storages::file::FileStore;
use redirectory::storages::memory::MemoryStore;
use tempfile::TempDir;

async fn hammer_resolutions(storage: Arc<dyn LinkStore>, id: &str, tasks: usize, per_task: usize) {
    let mut handles = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let storage = storage.clone();
        let id = id.to_string();
        handles.push(tokio::spawn(async move {
            for _ in 0..per_task {
                RedirectService::resolve(storage.as_ref(), &id)
                    .await
                    .expect("resolution should succeed");
            }
        }));
    }
    for handle in handles {
        handle.await.expect("resolution task panicked");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_resolutions_count_exactly_memory() {
    let storage: Arc<dyn LinkStore> = Arc::new(MemoryStore::new(6));
    let record = storage.create("https://example.com").await.unwrap();

    hammer_resolutions(storage.clone(), &record.id, 20, 25).await;

    assert_eq!(storage.get(&record.id).await.unwrap().access_count, 500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_resolutions_count_exactly_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.json");
    let storage: Arc<dyn LinkStore> = Arc::new(
        FileStore::new_async(path.to_str().unwrap(), 6)
            .await
            .unwrap(),
    );
    let record = storage.create("https://example.com").await.unwrap();

    hammer_resolutions(storage.clone(), &record.id, 8, 10).await;

    assert_eq!(storage.get(&record.id).await.unwrap().access_count, 80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_distinct_ids_do_not_interfere() {
    let storage: Arc<dyn LinkStore> = Arc::new(MemoryStore::new(6));

    let mut records = Vec::new();
    for _ in 0..4 {
        records.push(storage.create("https://example.com").await.unwrap());
    }

    let mut handles = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let storage = storage.clone();
        let id = record.id.clone();
        let hits = (i + 1) * 10;
        handles.push(tokio::spawn(async move {
            for _ in 0..hits {
                storage.increment_access(&id).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for (i, record) in records.iter().enumerate() {
        let count = storage.get(&record.id).await.unwrap().access_count;
        assert_eq!(count, ((i + 1) * 10) as u64);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creates_yield_distinct_ids() {
    let storage: Arc<dyn LinkStore> = Arc::new(MemoryStore::new(6));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..10 {
                ids.push(storage.create("https://example.com").await.unwrap().id);
            }
            ids
        }));
    }

    let mut all_ids = Vec::new();
    for handle in handles {
        all_ids.extend(handle.await.unwrap());
    }

    let total = all_ids.len();
    all_ids.sort();
    all_ids.dedup();
    assert_eq!(all_ids.len(), total);
    assert_eq!(storage.load_all().await.len(), total);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_feed_emits_once_per_mutation_under_load() {
    let storage: Arc<dyn LinkStore> = Arc::new(MemoryStore::new(6));
    let record = storage.create("https://example.com").await.unwrap();

    let mut sub = storage.subscribe().await;

    let mutations = 100;
    hammer_resolutions(storage.clone(), &record.id, 10, 10).await;

    // initial snapshot plus exactly one emission per increment
    let mut emissions = Vec::new();
    while let Some(snapshot) = sub.try_recv() {
        emissions.push(snapshot);
    }
    assert_eq!(emissions.len(), mutations + 1);

    // the final emission reflects every completed mutation
    let last = emissions.last().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].access_count, mutations as u64);

    // counters never move backwards across ordered emissions
    let mut previous = 0u64;
    for snapshot in &emissions {
        let count = snapshot[0].access_count;
        assert!(count >= previous);
        previous = count;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_edits_race_increments_without_torn_state() {
    let storage: Arc<dyn LinkStore> = Arc::new(MemoryStore::new(6));
    let record = storage.create("https://a.example").await.unwrap();

    let increments = {
        let storage = storage.clone();
        let id = record.id.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                storage.increment_access(&id).await.unwrap();
            }
        })
    };
    let edits = {
        let storage = storage.clone();
        let id = record.id.clone();
        tokio::spawn(async move {
            for i in 0..50 {
                let url = format!("https://edit{}.example", i);
                storage.update(&id, &url).await.unwrap();
            }
        })
    };

    increments.await.unwrap();
    edits.await.unwrap();

    let final_record = storage.get(&record.id).await.unwrap();
    assert_eq!(final_record.access_count, 100);
    assert_eq!(final_record.url, "https://edit49.example");
}
