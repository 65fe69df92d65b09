//! The ingestion actor.
//!
//! A single tokio task that exclusively owns the batch state and processes
//! [`Command`]s strictly in send order. This single-writer discipline is
//! what makes the pipeline race-free without locks: producers only ever
//! touch the command channel and the atomic counters.
//!
//! # Flush triggers
//!
//! 1. **Size**: pending reaches `batch_size`, checked right after a new
//!    unique observation is accepted.
//! 2. **Time**: the wait for the next command is bounded by
//!    `batch_timeout`; when it elapses with a non-empty pending buffer that
//!    has been idle at least `batch_timeout`, the actor flushes and resumes
//!    waiting. Expiry is a scheduling signal, not an error.
//! 3. **Explicit**: a `Flush` command flushes inline, before any further
//!    command, then completes its acknowledgement. FIFO ordering guarantees
//!    the flush covers every `Input` sent before the request.
//! 4. **Stop**: one final unconditional flush, acknowledge, exit. No
//!    command is accepted afterwards.
//!
//! Persistence is synchronous with respect to the loop: the sink call
//! completes (success or failure) before the next command is dequeued. A
//! failed flush re-merges its snapshot at the front of the pending buffer
//! and the next trigger retries it, so persistence failures degrade to
//! at-least-once rather than losing the batch.
//!
//! Aborting the actor task skips the final flush; callers that need
//! drainage must use the stop protocol (see [`super::handle`]).

use crate::config::IngestionSettings;
use crate::epc;
use crate::error::AppResult;
use crate::ingest::batch::BatchState;
use crate::ingest::command::Command;
use crate::ingest::counters::Counters;
use crate::observation::{DecodedFields, TagObservation, TagRecord};
use crate::session::SessionId;
use crate::sink::PersistenceSink;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::Instrument;

/// Single-owner batching/deduplication/flush processor.
pub struct IngestionActor {
    batch: BatchState,
    sink: Box<dyn PersistenceSink>,
    session: Option<SessionId>,
    counters: Arc<Counters>,
    batch_size: usize,
    batch_timeout: Duration,
}

impl IngestionActor {
    /// Creates an actor flushing to `sink`, optionally under a pre-existing
    /// session. With `None` the sink mints a session on the first flush.
    pub fn new(
        settings: &IngestionSettings,
        sink: Box<dyn PersistenceSink>,
        session: Option<SessionId>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            batch: BatchState::new(),
            sink,
            session,
            counters,
            batch_size: settings.batch_size,
            batch_timeout: settings.batch_timeout(),
        }
    }

    /// Runs the command loop until `Stop` arrives or every sender is gone.
    ///
    /// Consumes the actor; spawn this onto the runtime. Channel closure
    /// without a `Stop` still performs a final flush so buffered
    /// observations are not stranded, but the orderly stop protocol is the
    /// only path that lets the caller observe the outcome.
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<Command>) {
        info!(
            "Ingestion actor started (batch_size={}, batch_timeout={:?})",
            self.batch_size, self.batch_timeout
        );

        loop {
            match timeout(self.batch_timeout, command_rx.recv()).await {
                Ok(Some(Command::Input(observation))) => {
                    self.handle_input(observation).await;
                }
                Ok(Some(Command::Flush { ack })) => {
                    let result = self.flush().await;
                    let _ = ack.send(result);
                }
                Ok(Some(Command::Stop { ack })) => {
                    info!("Ingestion actor stopping; running final flush");
                    let result = self.flush().await;
                    let _ = ack.send(result);
                    break;
                }
                Ok(None) => {
                    warn!("Command channel closed without Stop; flushing and exiting");
                    if let Err(e) = self.flush().await {
                        error!("Final flush after channel closure failed: {e}");
                    }
                    break;
                }
                Err(_elapsed) => {
                    if !self.batch.is_empty() && self.batch.since_last_flush() >= self.batch_timeout
                    {
                        if let Err(e) = self.flush().await {
                            error!("Timed flush failed, batch retained: {e}");
                        }
                    }
                }
            }
        }

        info!("Ingestion actor stopped");
    }

    async fn handle_input(&mut self, observation: TagObservation) {
        self.counters.record_received();
        let identifier = observation.identifier.clone();
        if self.batch.accept(observation) {
            if self.batch.pending_len() >= self.batch_size {
                if let Err(e) = self.flush().await {
                    error!("Size-triggered flush failed, batch retained: {e}");
                }
            }
        } else {
            self.counters.record_repeat();
            debug!("Repeat observation dropped: {identifier}");
        }
    }

    /// Flushes the pending batch. Empty pending is an acked no-op.
    async fn flush(&mut self) -> AppResult<()> {
        let snapshot = self.batch.take_pending();
        if snapshot.is_empty() {
            return Ok(());
        }

        let records: Vec<TagRecord> = snapshot.iter().map(decode_record).collect();
        let span = tracing::info_span!("flush", batch_len = records.len());

        match self.sink.persist(self.session, &records).instrument(span).await {
            Ok(session) => {
                self.session = Some(session);
                self.counters.record_persisted(snapshot.len() as u64);
                debug!(
                    "Flushed {} observations to session {session}",
                    snapshot.len()
                );
                Ok(())
            }
            Err(e) => {
                self.counters.record_flush_failure();
                warn!(
                    "Persisting {} observations failed, re-queueing for retry: {e}",
                    snapshot.len()
                );
                self.batch.restore_front(snapshot);
                Err(e)
            }
        }
    }
}

/// Decodes an observation into its persisted record form.
///
/// A malformed identifier keeps its raw fields and is logged; corrupt data
/// must reach storage visibly rather than be skipped.
fn decode_record(observation: &TagObservation) -> TagRecord {
    let fields = match epc::decode(&observation.identifier) {
        Ok(decoded) => Some(DecodedFields::from(decoded)),
        Err(e) => {
            warn!(
                "Identifier '{}' is not a valid SGTIN-96 EPC: {e}",
                observation.identifier
            );
            None
        }
    };
    TagRecord {
        observation: observation.clone(),
        epc: fields,
    }
}
