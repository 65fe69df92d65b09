//! Integration test for the enqueue backpressure policy.
//!
//! The producer-facing `enqueue` must never block, even while the actor is
//! stuck inside a slow persistence call. Once the bounded command queue
//! fills, the newest observations are dropped and counted; nothing already
//! accepted is lost.

use async_trait::async_trait;
use rfid_ingest::config::IngestionSettings;
use rfid_ingest::epc;
use rfid_ingest::error::AppResult;
use rfid_ingest::ingest::IngestionHandle;
use rfid_ingest::observation::{TagObservation, TagRecord};
use rfid_ingest::session::SessionId;
use rfid_ingest::sink::{MemorySink, PersistenceSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Sink that parks the actor inside its first persist call until released.
/// Later calls delegate straight to the inner memory sink.
#[derive(Clone)]
struct StallOnceSink {
    inner: MemorySink,
    entered: Arc<Notify>,
    release: Arc<Notify>,
    stalled: Arc<AtomicBool>,
}

impl StallOnceSink {
    fn new(inner: MemorySink) -> Self {
        Self {
            inner,
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            stalled: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl PersistenceSink for StallOnceSink {
    async fn persist(
        &mut self,
        session: Option<SessionId>,
        items: &[TagRecord],
    ) -> AppResult<SessionId> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.persist(session, items).await
    }
}

fn tag(serial: u64) -> String {
    epc::encode(1, "0614141", "812345", serial).expect("test EPC must encode")
}

#[tokio::test]
async fn full_queue_drops_newest_and_counts_them() {
    const QUEUE_CAPACITY: usize = 4;
    const OVERFLOW: usize = 6;

    let settings = IngestionSettings {
        batch_size: 1, // first unique observation flushes immediately
        batch_timeout_ms: 60_000,
        queue_capacity: QUEUE_CAPACITY,
    };
    let memory = MemorySink::new();
    let sink = StallOnceSink::new(memory.clone());
    let entered = Arc::clone(&sink.entered);
    let release = Arc::clone(&sink.release);

    let (handle, task) = IngestionHandle::spawn(&settings, Box::new(sink), None);

    // First observation drives the actor into the stalled persist call.
    handle.enqueue(TagObservation::new(tag(0)));
    entered.notified().await;

    // The actor is parked; the queue absorbs exactly QUEUE_CAPACITY more
    // sends, then drop-newest kicks in. None of these calls may block.
    for serial in 1..=(QUEUE_CAPACITY + OVERFLOW) as u64 {
        handle.enqueue(TagObservation::new(tag(serial)));
    }
    assert_eq!(
        handle.counters().dropped,
        OVERFLOW as u64,
        "everything beyond the queue capacity is dropped and counted"
    );

    release.notify_one();
    handle.flush().await.unwrap();
    handle.stop().await.unwrap();
    task.await.unwrap();

    // The stalled observation plus everything the queue absorbed survived.
    assert_eq!(memory.persisted_count(), 1 + QUEUE_CAPACITY);
    let counters = handle.counters();
    assert_eq!(counters.received, (1 + QUEUE_CAPACITY) as u64);
    assert_eq!(counters.persisted, (1 + QUEUE_CAPACITY) as u64);
    assert_eq!(counters.repeats, 0);
}

#[tokio::test]
async fn enqueue_returns_immediately_while_actor_is_stalled() {
    let settings = IngestionSettings {
        batch_size: 1,
        batch_timeout_ms: 60_000,
        queue_capacity: 2,
    };
    let memory = MemorySink::new();
    let sink = StallOnceSink::new(memory.clone());
    let entered = Arc::clone(&sink.entered);
    let release = Arc::clone(&sink.release);

    let (handle, task) = IngestionHandle::spawn(&settings, Box::new(sink), None);
    handle.enqueue(TagObservation::new(tag(0)));
    entered.notified().await;

    // 100 fire-and-forget sends against a capacity-2 queue and a parked
    // actor; a wall-clock bound catches any accidental blocking.
    let start = std::time::Instant::now();
    for serial in 1..=100 {
        handle.enqueue(TagObservation::new(tag(serial)));
    }
    assert!(
        start.elapsed() < std::time::Duration::from_secs(1),
        "enqueue must not suspend the producer"
    );

    release.notify_one();
    handle.stop().await.unwrap();
    task.await.unwrap();
}
