//! # RFID Ingestion Pipeline
//!
//! This crate ingests a high-rate stream of RFID tag observations from a
//! scanning device, deduplicates them, batches them for efficient
//! persistence, and guarantees that no observed tag is lost even when
//! scanning stops abruptly. It also contains the SGTIN-96 EPC codec that
//! gives tag identifiers their structured meaning.
//!
//! ## Crate Structure
//!
//! The library is organized into modules with distinct responsibilities:
//!
//! - **`epc`**: Pure, stateless SGTIN-96 codec: bit-level encode/decode,
//!   partition table, GS1 check digit, GTIN-14 and URN derivation.
//! - **`observation`**: The raw [`observation::TagObservation`] read and the
//!   decoded [`observation::TagRecord`] form handed to persistence.
//! - **`ingest`**: The batching/deduplication actor, its command protocol,
//!   counters, and the producer-facing [`ingest::IngestionHandle`].
//! - **`sink`**: The [`sink::PersistenceSink`] seam plus in-memory and CSV
//!   implementations.
//! - **`device`**: The [`device::DeviceEventSource`] seam plus a mock reader
//!   that simulates a scanning device without hardware.
//! - **`session`**: Lazily created inventory-session identity.
//! - **`config`**: Typed settings loaded from TOML with validation.
//! - **`error`**: The crate-wide [`error::RfidError`] type.
//!
//! ## Concurrency model
//!
//! Exactly one actor task owns all mutable pipeline state. Any number of
//! producers communicate with it through a bounded command channel;
//! acknowledged operations (`flush`, `stop`) await a oneshot completion.
//! Observation enqueue never blocks: under overload the newest read is
//! dropped and counted rather than stalling the device path.

pub mod config;
pub mod device;
pub mod epc;
pub mod error;
pub mod ingest;
pub mod observation;
pub mod session;
pub mod sink;

pub use error::{AppResult, RfidError};
pub use ingest::{CountersSnapshot, IngestionHandle};
pub use observation::{TagObservation, TagRecord};
pub use session::SessionId;
