//! Batching, deduplication, and flush pipeline.
//!
//! Converts an unbounded, possibly-duplicated stream of tag observations
//! into ordered, size- and time-bounded batches persisted exactly once per
//! batch. One actor task owns all mutable state; producers communicate with
//! it only through a bounded command channel and oneshot acknowledgements.
//!
//! ```no_run
//! use rfid_ingest::config::IngestionSettings;
//! use rfid_ingest::ingest::IngestionHandle;
//! use rfid_ingest::observation::TagObservation;
//! use rfid_ingest::sink::MemorySink;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = IngestionSettings::default();
//! let (handle, task) = IngestionHandle::spawn(&settings, Box::new(MemorySink::new()), None);
//!
//! handle.enqueue(TagObservation::new("3074257BF7194E4000001A85"));
//! handle.flush().await?;
//! handle.stop().await?;
//! task.await?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod batch;
pub mod command;
pub mod counters;
pub mod handle;

pub use actor::IngestionActor;
pub use batch::BatchState;
pub use command::Command;
pub use counters::{Counters, CountersSnapshot};
pub use handle::IngestionHandle;
