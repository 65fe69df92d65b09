//! Persistence sinks for flushed batches.
//!
//! A [`PersistenceSink`] durably stores one batch of decoded tag records,
//! grouped under an inventory session. The ingestion actor calls it once per
//! flush and waits for the result before processing the next command, so a
//! completed flush is durable (or reported failed) before any later flush
//! can start.

pub mod memory;

#[cfg(feature = "storage_csv")]
pub mod csv;

use crate::error::AppResult;
use crate::observation::TagRecord;
use crate::session::SessionId;
use async_trait::async_trait;

pub use memory::MemorySink;

#[cfg(feature = "storage_csv")]
pub use csv::CsvSink;

/// Durable storage for flushed batches.
///
/// Contract: safe to call repeatedly with disjoint batches under the same
/// session; when `session` is `None` the sink mints an id and returns it so
/// subsequent flushes can reuse it. Items arrive in observation order.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Stores one batch, creating the session if needed.
    async fn persist(
        &mut self,
        session: Option<SessionId>,
        items: &[TagRecord],
    ) -> AppResult<SessionId>;
}
