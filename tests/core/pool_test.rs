use pingwatch::core::pool::{Settled, WorkerPool};
use pingwatch::core::probe::{ProbeOutcome, ProbeStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn dummy_outcome(name: &str) -> ProbeOutcome {
    ProbeOutcome {
        service_name: name.to_string(),
        timestamp: chrono::Utc::now(),
        method: pingwatch::config::Method::Get,
        status: ProbeStatus::Pass,
        latency_ms: 1,
        http_status_code: 200,
        expected_status: 200,
        text_validation_result: None,
        header_validation_result: None,
        failure_reason: String::new(),
        correlation_id: uuid::Uuid::new_v4(),
    }
}

#[tokio::test]
async fn settles_every_task_in_the_batch() {
    let pool = WorkerPool::new(4);
    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let name = format!("svc-{i}");
            (name.clone(), move || async move { dummy_outcome(&name) })
        })
        .collect();

    let settled = pool.run_batch(tasks).await;
    assert_eq!(settled.len(), 10);
    assert!(settled.iter().all(|s| matches!(s, Settled::Fulfilled(_))));
}

#[tokio::test]
async fn never_exceeds_the_configured_concurrency() {
    let pool = WorkerPool::new(3);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_observed = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..12)
        .map(|i| {
            let name = format!("svc-{i}");
            let in_flight = Arc::clone(&in_flight);
            let max_observed = Arc::clone(&max_observed);
            (name.clone(), move || async move {
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                dummy_outcome(&name)
            })
        })
        .collect();

    pool.run_batch(tasks).await;
    assert!(max_observed.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn a_panicking_task_is_recorded_as_a_rejection_not_a_batch_failure() {
    let pool = WorkerPool::new(2);

    let panicking_tasks: Vec<(String, _)> = vec![(
        "bad".to_string(),
        move || async move {
            panic!("simulated worker panic");
            #[allow(unreachable_code)]
            dummy_outcome("bad")
        },
    )];
    let settled = pool.run_batch(panicking_tasks).await;
    assert_eq!(settled.len(), 1);
    match &settled[0] {
        Settled::Rejected { service_name, .. } => assert_eq!(service_name, "bad"),
        Settled::Fulfilled(_) => panic!("expected a rejection"),
    }
}

#[tokio::test]
async fn pool_size_zero_resolves_to_available_parallelism() {
    let pool = WorkerPool::new(0);
    assert!(pool.size() >= 1);
}
