//! In-memory persistence sink.
//!
//! Used by the integration tests and the demo binary's dry-run mode. Keeps
//! every persisted batch, and can be told to fail the next N persist calls
//! to exercise the actor's retry path. State lives behind an `Arc` so a
//! clone held by a test still observes batches persisted by the actor's
//! copy.

use crate::error::{AppResult, RfidError};
use crate::observation::TagRecord;
use crate::session::SessionId;
use crate::sink::PersistenceSink;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    session: Option<SessionId>,
    batches: Vec<Vec<TagRecord>>,
    fail_remaining: usize,
}

/// Shared in-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` persist calls fail with a storage error.
    pub fn fail_next(&self, n: usize) {
        self.lock().fail_remaining = n;
    }

    /// Snapshot of every persisted batch, in flush order.
    pub fn batches(&self) -> Vec<Vec<TagRecord>> {
        self.lock().batches.clone()
    }

    /// Identifiers of every persisted record, across all batches.
    pub fn persisted_identifiers(&self) -> Vec<String> {
        self.lock()
            .batches
            .iter()
            .flatten()
            .map(|record| record.observation.identifier.clone())
            .collect()
    }

    /// Total records persisted across all batches.
    pub fn persisted_count(&self) -> usize {
        self.lock().batches.iter().map(Vec::len).sum()
    }

    /// The session id minted or adopted on first successful persist.
    pub fn session(&self) -> Option<SessionId> {
        self.lock().session
    }

    // A poisoned lock means a panicking test thread; propagating the
    // panic is the right outcome there.
    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn persist(
        &mut self,
        session: Option<SessionId>,
        items: &[TagRecord],
    ) -> AppResult<SessionId> {
        let mut inner = self.lock();
        if inner.fail_remaining > 0 {
            inner.fail_remaining -= 1;
            return Err(RfidError::Storage("injected persistence failure".into()));
        }
        let id = session
            .or(inner.session)
            .unwrap_or_else(SessionId::generate);
        inner.session = Some(id);
        inner.batches.push(items.to_vec());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::TagObservation;

    fn record(identifier: &str) -> TagRecord {
        TagRecord {
            observation: TagObservation::new(identifier),
            epc: None,
        }
    }

    #[tokio::test]
    async fn reuses_the_session_it_minted() {
        let mut sink = MemorySink::new();
        let first = sink.persist(None, &[record("AA")]).await.unwrap();
        let second = sink.persist(Some(first), &[record("BB")]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(sink.batches().len(), 2);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let mut sink = MemorySink::new();
        sink.fail_next(1);
        assert!(sink.persist(None, &[record("AA")]).await.is_err());
        assert!(sink.persist(None, &[record("AA")]).await.is_ok());
        assert_eq!(sink.persisted_count(), 1);
    }

    #[tokio::test]
    async fn clones_observe_the_same_state() {
        let mut sink = MemorySink::new();
        let view = sink.clone();
        sink.persist(None, &[record("AA")]).await.unwrap();
        assert_eq!(view.persisted_identifiers(), vec!["AA".to_string()]);
    }
}
