//! CLI entry point for rfid_ingest.
//!
//! Runs the ingestion pipeline against the mock reader: observations flow
//! through the actor into a CSV file (or an in-memory sink with
//! `--dry-run`), and the pipeline counters are printed on exit.
//!
//! # Usage
//!
//! Scan for ten seconds into `data/`:
//! ```bash
//! rfid_ingest scan --duration 10
//! ```
//!
//! Decode a single EPC from the command line:
//! ```bash
//! rfid_ingest decode 3074257BF7194E4000001A85
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rfid_ingest::config::Settings;
use rfid_ingest::device::{DeviceEventSource, MockReader};
use rfid_ingest::epc;
use rfid_ingest::ingest::IngestionHandle;
use rfid_ingest::sink::{MemorySink, PersistenceSink};

#[derive(Parser)]
#[command(name = "rfid_ingest")]
#[command(about = "RFID tag ingestion pipeline with SGTIN-96 codec", long_about = None)]
struct Cli {
    /// Named configuration under config/ (defaults to "default").
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mock reader through the pipeline for a fixed duration.
    Scan {
        /// How long to scan, in seconds.
        #[arg(long, default_value = "10")]
        duration: u64,

        /// Persist to memory only; print counters without writing files.
        #[arg(long)]
        dry_run: bool,
    },

    /// Decode an SGTIN-96 EPC and print its structured fields.
    Decode {
        /// 24 hex characters, optionally 0x-prefixed.
        epc: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref()).context("loading configuration")?;

    env_logger::Builder::new()
        .parse_filters(&settings.log_level)
        .init();

    match cli.command {
        Commands::Scan { duration, dry_run } => scan(&settings, duration, dry_run).await,
        Commands::Decode { epc } => decode(&epc),
    }
}

async fn scan(settings: &Settings, duration: u64, dry_run: bool) -> Result<()> {
    let sink: Box<dyn PersistenceSink> = if dry_run {
        Box::new(MemorySink::new())
    } else {
        build_storage_sink(settings)?
    };

    let (handle, actor_task) = IngestionHandle::spawn(&settings.ingestion, sink, None);
    let mut reader = MockReader::new(settings.reader.clone());
    reader.start(handle.clone()).context("starting mock reader")?;

    tokio::time::sleep(std::time::Duration::from_secs(duration)).await;

    // Stop protocol: producer first, then drain, then stop.
    reader.stop().await.context("stopping mock reader")?;
    handle.flush().await.context("draining pipeline")?;
    handle.stop().await.context("stopping ingestion actor")?;
    actor_task.await.context("joining ingestion actor")?;

    let counters = handle.counters();
    println!("received:       {}", counters.received);
    println!("persisted:      {}", counters.persisted);
    println!("repeats:        {}", counters.repeats);
    println!("dropped:        {}", counters.dropped);
    println!("flush failures: {}", counters.flush_failures);
    Ok(())
}

fn build_storage_sink(settings: &Settings) -> Result<Box<dyn PersistenceSink>> {
    match settings.storage.default_format.as_str() {
        #[cfg(feature = "storage_csv")]
        "csv" => Ok(Box::new(rfid_ingest::sink::CsvSink::new(&settings.storage))),
        "memory" => Ok(Box::new(MemorySink::new())),
        other => anyhow::bail!("unsupported storage format '{other}'"),
    }
}

fn decode(hex: &str) -> Result<()> {
    let epc = epc::decode(hex).context("decoding EPC")?;
    println!("filter:         {}", epc.filter);
    println!("partition:      {}", epc.partition);
    println!("company prefix: {}", epc.company_prefix);
    println!("item reference: {}", epc.item_reference);
    println!("serial number:  {}", epc.serial_number);
    println!("gtin-14:        {}", epc.gtin14);
    println!("tag urn:        {}", epc.tag_urn);
    println!("id urn:         {}", epc.id_urn);
    Ok(())
}
