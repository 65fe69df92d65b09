//! Device event sources.
//!
//! A [`DeviceEventSource`] pushes raw tag observations into the pipeline
//! through an [`IngestionHandle`]. Sources may emit at arbitrarily high rate
//! and with duplicates; delivery uses the handle's non-blocking `enqueue`,
//! so a slow pipeline can never stall the device path.
//!
//! [`MockReader`] simulates an RFID scanning device without hardware: it
//! draws from a pre-generated population of valid SGTIN-96 EPCs at a
//! configurable rate, re-reading already-seen tags at a configurable ratio
//! the way a real antenna re-reads tags sitting in its field.

use crate::config::ReaderSettings;
use crate::epc;
use crate::error::{AppResult, RfidError};
use crate::ingest::IngestionHandle;
use crate::observation::TagObservation;
use async_trait::async_trait;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

/// A push-style source of tag observations.
#[async_trait]
pub trait DeviceEventSource: Send {
    /// Starts emitting observations into `pipeline`.
    fn start(&mut self, pipeline: IngestionHandle) -> AppResult<()>;

    /// Stops emission and waits for the emitter to wind down. After this
    /// returns, no further observation will be enqueued.
    async fn stop(&mut self) -> AppResult<()>;
}

/// Simulated RFID reader.
pub struct MockReader {
    settings: ReaderSettings,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl MockReader {
    /// Creates a reader with the given emission settings.
    pub fn new(settings: ReaderSettings) -> Self {
        Self {
            settings,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Generates the tag population the reader draws from.
    ///
    /// Serial numbers are sequential so every generated EPC is distinct;
    /// filter and item reference vary to exercise the codec.
    fn generate_population(count: usize, rng: &mut StdRng) -> Vec<String> {
        (0..count)
            .filter_map(|serial| {
                let filter = rng.gen_range(0..=7);
                let item: u32 = rng.gen_range(0..=999_999);
                epc::encode(filter, "0614141", &item.to_string(), serial as u64).ok()
            })
            .collect()
    }
}

#[async_trait]
impl DeviceEventSource for MockReader {
    fn start(&mut self, pipeline: IngestionHandle) -> AppResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RfidError::Configuration("mock reader already running".into()));
        }
        let running = Arc::clone(&self.running);
        let settings = self.settings.clone();

        self.task = Some(tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let population = Self::generate_population(settings.tag_population, &mut rng);
            if population.is_empty() {
                warn!("Mock reader has an empty tag population; emitting nothing");
                return;
            }
            let period = Duration::from_secs(1) / settings.reads_per_sec.max(1);
            let mut ticker = interval(period);
            // Index below which tags count as already in the antenna field.
            let mut seen_upto = 0usize;
            info!(
                "Mock reader emitting {} reads/sec over {} tags",
                settings.reads_per_sec,
                population.len()
            );

            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                let emit_duplicate = seen_upto > 0
                    && (seen_upto >= population.len()
                        || rng.gen_bool(settings.duplicate_ratio));
                let index = if emit_duplicate {
                    rng.gen_range(0..seen_upto)
                } else {
                    seen_upto += 1;
                    seen_upto - 1
                };
                let observation = TagObservation::new(population[index].clone())
                    .with_rssi(rng.gen_range(-80..=-30));
                pipeline.enqueue(observation);
            }
            info!("Mock reader stopped after covering {seen_upto} unique tags");
        }));
        Ok(())
    }

    async fn stop(&mut self) -> AppResult<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| RfidError::Configuration(format!("mock reader task failed: {e}")))?;
        }
        Ok(())
    }
}
