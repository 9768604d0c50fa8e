//! Concurrent Submission Tests
//!
//! Simultaneous submissions for the same (gymnast, event, apparatus) key must
//! leave exactly one stored sheet, equal to one of the submitted payloads.

use std::sync::Arc;

use gymscore::application::identity::RequestIdentity;
use gymscore::application::services::ScoringService;
use gymscore::domain::entities::roster::{Apparatus, GymnastProfile};
use gymscore::domain::entities::score::{ScoreInput, ScoreKey};
use gymscore::domain::repositories::ScoreStore;
use gymscore::persistence::memory::InMemoryScoreStore;
use gymscore::persistence::repository::SqliteScoreStore;
use gymscore::persistence::{init_database, DatabaseConfig};
use tokio::task::JoinSet;

const WRITERS: i64 = 16;

async fn seed(store: &dyn ScoreStore) {
    store
        .register_gymnast(&GymnastProfile {
            id: 1,
            name: "Ana Silva".to_string(),
            category: "Senior".to_string(),
            team: None,
        })
        .await
        .unwrap();
    store
        .register_apparatus(&Apparatus {
            id: 1,
            name: "Beam".to_string(),
        })
        .await
        .unwrap();
}

/// Every field of writer `n`'s sheet is derived from `n`, so a mixed record is detectable
fn payload(n: i64) -> ScoreInput {
    let d = 1.0 + n as f64 * 0.25;
    let mark = 5.0 + n as f64 * 0.1;
    ScoreInput {
        gymnast_id: 1,
        event_id: 1,
        apparatus_id: 1,
        d1: d,
        d2: d,
        d3: d,
        d4: d,
        a1: mark,
        a2: mark,
        a3: mark,
        e1: mark,
        e2: mark,
        e3: mark,
        technical_deduction: n as f64 * 0.01,
    }
}

async fn race(service: Arc<ScoringService>) {
    let mut writers = JoinSet::new();
    for n in 0..WRITERS {
        let service = Arc::clone(&service);
        writers.spawn(async move {
            service
                .submit(&RequestIdentity::administrator(n + 1), payload(n))
                .await
        });
    }

    while let Some(result) = writers.join_next().await {
        result.unwrap().unwrap();
    }

    let rows = service.store().list_by_event(1).await.unwrap();
    assert_eq!(rows.len(), 1, "one sheet per key");

    let stored = service
        .store()
        .get(&ScoreKey::new(1, 1, 1))
        .await
        .unwrap()
        .unwrap();
    let writer = stored.judge_id - 1;
    let expected = payload(writer).validate().unwrap();
    assert_eq!(stored.components, expected, "sheet fields come from one writer");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_in_memory() {
    let store = InMemoryScoreStore::new();
    seed(&store).await;
    race(Arc::new(ScoringService::new(Arc::new(store)).with_cache())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_sqlite() {
    let pool = init_database(&DatabaseConfig::in_memory()).await.unwrap();
    let store = SqliteScoreStore::new(pool);
    seed(&store).await;
    race(Arc::new(ScoringService::new(Arc::new(store)))).await;
}
