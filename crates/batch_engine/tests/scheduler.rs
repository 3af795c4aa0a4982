use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use batch_core::{CallOutcome, CategoryRecord, Credentials, ResultRecord};
use batch_engine::{EngineEvent, EngineHandle, RemoteCaller};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct EchoCaller {
    seen: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl RemoteCaller for EchoCaller {
    async fn call(&self, target: &str, _credentials: &Credentials) -> CallOutcome {
        self.seen.lock().unwrap().push(target.to_string());
        CallOutcome::Record(ResultRecord::Categories(CategoryRecord {
            url: target.to_string(),
            categories: Vec::new(),
        }))
    }
}

fn targets(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://t.example/{i}")).collect()
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

/// Drains events for `window`, returning everything observed.
fn drain_for(engine: &EngineHandle, window: Duration) -> Vec<EngineEvent> {
    let deadline = Instant::now() + window;
    let mut events = Vec::new();
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match engine.recv_timeout(left) {
            Some(event) => events.push(event),
            None => break,
        }
    }
    events
}

#[test]
fn calls_fire_in_index_order_no_earlier_than_their_offset() {
    let caller = Arc::new(EchoCaller::default());
    let engine = EngineHandle::new(caller.clone());
    let stagger = Duration::from_millis(40);
    engine.schedule(1, targets(3), stagger, Credentials::new("k"));

    let mut dispatched = Vec::new();
    let mut settled = 0;
    while settled < 3 {
        match next_event(&engine) {
            EngineEvent::CallDispatched { job_id, index, after } => {
                assert_eq!(job_id, 1);
                assert!(after >= stagger * index as u32, "{index} fired after {after:?}");
                dispatched.push(index);
            }
            EngineEvent::CallSettled { job_id, outcome, .. } => {
                assert_eq!(job_id, 1);
                assert!(matches!(outcome, CallOutcome::Record(_)));
                settled += 1;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(dispatched, vec![0, 1, 2]);
    assert_eq!(*caller.seen.lock().unwrap(), targets(3));
}

#[test]
fn zero_stagger_fires_everything() {
    let engine = EngineHandle::new(Arc::new(EchoCaller::default()));
    engine.schedule(4, targets(5), Duration::ZERO, Credentials::new("k"));

    let settled = drain_for(&engine, Duration::from_millis(500))
        .into_iter()
        .filter(|event| matches!(event, EngineEvent::CallSettled { .. }))
        .count();
    assert_eq!(settled, 5);
}

#[test]
fn cancel_suppresses_every_unfired_call() {
    let caller = Arc::new(EchoCaller::default());
    let engine = EngineHandle::new(caller.clone());
    engine.schedule(7, targets(4), Duration::from_millis(300), Credentials::new("k"));

    assert!(matches!(
        next_event(&engine),
        EngineEvent::CallDispatched { job_id: 7, index: 0, .. }
    ));
    engine.cancel(7);

    let events = drain_for(&engine, Duration::from_millis(1200));
    let cancelled: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::JobCancelled {
                job_id,
                fired,
                suppressed,
            } => Some((*job_id, *fired, *suppressed)),
            _ => None,
        })
        .collect();
    assert_eq!(cancelled, vec![(7, 1, 3)]);
    assert!(events
        .iter()
        .all(|event| !matches!(event, EngineEvent::CallDispatched { .. })));
    assert_eq!(caller.seen.lock().unwrap().len(), 1);
}

#[test]
fn repeated_cancel_reports_the_same_counts() {
    let engine = EngineHandle::new(Arc::new(EchoCaller::default()));
    engine.schedule(9, targets(3), Duration::from_millis(300), Credentials::new("k"));
    assert!(matches!(
        next_event(&engine),
        EngineEvent::CallDispatched { job_id: 9, index: 0, .. }
    ));

    let cancel_counts = |events: Vec<EngineEvent>| -> Vec<(usize, usize)> {
        events
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::JobCancelled {
                    fired, suppressed, ..
                } => Some((fired, suppressed)),
                _ => None,
            })
            .collect()
    };

    engine.cancel(9);
    // Long enough for the settled and cancelled tasks to finish and be pruned.
    let first = cancel_counts(drain_for(&engine, Duration::from_millis(500)));
    engine.cancel(9);
    let second = cancel_counts(drain_for(&engine, Duration::from_millis(300)));

    assert_eq!(first, vec![(1, 2)]);
    assert_eq!(second, vec![(1, 2)]);
}

#[test]
fn new_job_supersedes_older_unfired_calls() {
    let caller = Arc::new(EchoCaller::default());
    let engine = EngineHandle::new(caller.clone());
    engine.schedule(1, targets(3), Duration::from_millis(300), Credentials::new("k"));
    assert!(matches!(
        next_event(&engine),
        EngineEvent::CallDispatched { job_id: 1, index: 0, .. }
    ));

    engine.schedule(
        2,
        vec!["https://new.example/".to_string()],
        Duration::ZERO,
        Credentials::new("k"),
    );
    let events = drain_for(&engine, Duration::from_millis(1000));

    let late_dispatches = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::CallDispatched { job_id: 1, .. }))
        .count();
    assert_eq!(late_dispatches, 0);
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::CallSettled { job_id: 2, index: 0, .. })));
}

#[test]
fn cancel_of_unknown_job_is_acknowledged() {
    let engine = EngineHandle::new(Arc::new(EchoCaller::default()));
    engine.cancel(42);
    assert_eq!(
        next_event(&engine),
        EngineEvent::JobCancelled {
            job_id: 42,
            fired: 0,
            suppressed: 0,
        }
    );
}
