//! Command types for the ingestion actor.
//!
//! Producers talk to the actor exclusively through [`Command`] values sent
//! over an mpsc channel. `Flush` and `Stop` embed a `oneshot::Sender` so the
//! caller can await the acknowledgement; `Input` is fire-and-forget. The
//! helper constructors return the command together with its receiver, so a
//! caller always holds something to await.

use crate::error::AppResult;
use crate::observation::TagObservation;
use tokio::sync::oneshot;

/// A command processed by the ingestion actor, strictly in send order.
#[derive(Debug)]
pub enum Command {
    /// One raw tag observation from the device path.
    Input(TagObservation),
    /// Flush the pending batch now and acknowledge when done.
    Flush {
        /// Completed with the flush outcome once the batch is persisted.
        ack: oneshot::Sender<AppResult<()>>,
    },
    /// Final flush, acknowledge, then terminate the actor loop.
    Stop {
        /// Completed with the final flush outcome just before exit.
        ack: oneshot::Sender<AppResult<()>>,
    },
}

impl Command {
    /// Creates a `Flush` command and the receiver for its acknowledgement.
    pub fn flush() -> (Self, oneshot::Receiver<AppResult<()>>) {
        let (ack, rx) = oneshot::channel();
        (Command::Flush { ack }, rx)
    }

    /// Creates a `Stop` command and the receiver for its acknowledgement.
    pub fn stop() -> (Self, oneshot::Receiver<AppResult<()>>) {
        let (ack, rx) = oneshot::channel();
        (Command::Stop { ack }, rx)
    }
}
