//! Producer-facing handle for the ingestion pipeline.
//!
//! [`IngestionHandle`] is the only public surface producers see. It is cheap
//! to clone; every clone talks to the same actor over the same bounded
//! command channel.
//!
//! # Backpressure policy
//!
//! [`enqueue`](IngestionHandle::enqueue) never blocks or suspends: it is
//! called from the device's event-delivery path, which must keep servicing
//! new reads. When the command queue is full the *newest* observation is
//! dropped, logged at debug level, and counted. Under sustained overload
//! this sheds raw reads instead of blocking the reader or growing memory
//! without bound. `flush` and `stop` are intentionally synchronous and use
//! the suspending send.
//!
//! # Stop protocol
//!
//! Stop the upstream producer first, then `flush().await` to drain anything
//! already enqueued, then `stop().await`. The final flush inside `stop`
//! covers stragglers that arrived between the two calls.

use crate::config::IngestionSettings;
use crate::error::{AppResult, RfidError};
use crate::ingest::actor::IngestionActor;
use crate::ingest::command::Command;
use crate::ingest::counters::{Counters, CountersSnapshot};
use crate::observation::TagObservation;
use crate::session::SessionId;
use crate::sink::PersistenceSink;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

/// Handle to a running ingestion actor.
#[derive(Clone)]
pub struct IngestionHandle {
    command_tx: mpsc::Sender<Command>,
    counters: Arc<Counters>,
}

impl IngestionHandle {
    /// Spawns the actor onto the current runtime and returns the handle
    /// together with the actor task's join handle.
    pub fn spawn(
        settings: &IngestionSettings,
        sink: Box<dyn PersistenceSink>,
        session: Option<SessionId>,
    ) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(settings.queue_capacity);
        let counters = Arc::new(Counters::default());
        let actor = IngestionActor::new(settings, sink, session, Arc::clone(&counters));
        let task = tokio::spawn(actor.run(command_rx));
        (
            Self {
                command_tx,
                counters,
            },
            task,
        )
    }

    /// Enqueues one observation. Fire-and-forget, never blocks.
    ///
    /// Silently drops the observation (logged, counted) when the queue is
    /// full or the actor has stopped.
    pub fn enqueue(&self, observation: TagObservation) {
        match self.command_tx.try_send(Command::Input(observation)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.counters.record_dropped();
                debug!("Command queue full; dropping newest observation");
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.record_dropped();
                warn!("Ingestion actor stopped; dropping observation");
            }
        }
    }

    /// Flushes the pending batch and waits for the acknowledgement.
    ///
    /// FIFO guarantee: every observation enqueued before this call is
    /// processed before the flush executes, so the flush covers all of them.
    pub async fn flush(&self) -> AppResult<()> {
        self.roundtrip(Command::flush()).await
    }

    /// Requests a final flush and actor termination, waiting for both.
    pub async fn stop(&self) -> AppResult<()> {
        self.roundtrip(Command::stop()).await
    }

    /// Read-only snapshot of the pipeline counters.
    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    /// Sends an acknowledged command and awaits its outcome. A closed
    /// channel on either leg resolves to [`RfidError::ActorStopped`]
    /// instead of hanging the caller.
    async fn roundtrip(
        &self,
        (command, ack_rx): (Command, tokio::sync::oneshot::Receiver<AppResult<()>>),
    ) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RfidError::ActorStopped)?;
        ack_rx.await.map_err(|_| RfidError::ActorStopped)?
    }
}
