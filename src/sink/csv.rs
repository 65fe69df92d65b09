//! CSV file persistence sink.
//!
//! Writes one CSV file per inventory session under the configured storage
//! directory. The file is created on the first flush of the session; each
//! subsequent batch appends rows and flushes the writer so a crash between
//! batches never loses a completed flush.

use crate::config::StorageSettings;
use crate::error::{AppResult, RfidError};
use crate::observation::TagRecord;
use crate::session::SessionId;
use crate::sink::PersistenceSink;
use async_trait::async_trait;
use std::fs::File;
use std::path::PathBuf;

const HEADER: [&str; 9] = [
    "observed_at",
    "identifier",
    "tag_id",
    "rssi",
    "company_prefix",
    "item_reference",
    "serial_number",
    "gtin14",
    "id_urn",
];

/// A sink writing decoded tag records to a per-session CSV file.
pub struct CsvSink {
    directory: PathBuf,
    session: Option<SessionId>,
    writer: Option<csv::Writer<File>>,
}

impl CsvSink {
    /// Creates a sink writing under the configured storage path.
    pub fn new(storage: &StorageSettings) -> Self {
        Self {
            directory: PathBuf::from(&storage.default_path),
            session: None,
            writer: None,
        }
    }

    /// The file the current session writes to, once one exists.
    pub fn path(&self) -> Option<PathBuf> {
        self.session
            .map(|id| self.directory.join(format!("inventory_{id}.csv")))
    }

    fn open_writer(&mut self, session: SessionId) -> AppResult<()> {
        if !self.directory.exists() {
            std::fs::create_dir_all(&self.directory)
                .map_err(|e| RfidError::Storage(e.to_string()))?;
        }
        let path = self.directory.join(format!("inventory_{session}.csv"));
        let file =
            File::create(&path).map_err(|e| RfidError::Storage(format!("create {}: {e}", path.display())))?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(HEADER)
            .map_err(|e| RfidError::Storage(e.to_string()))?;
        log::info!("CSV sink writing session {} to '{}'", session, path.display());
        self.session = Some(session);
        self.writer = Some(writer);
        Ok(())
    }
}

#[async_trait]
impl PersistenceSink for CsvSink {
    async fn persist(
        &mut self,
        session: Option<SessionId>,
        items: &[TagRecord],
    ) -> AppResult<SessionId> {
        let id = session
            .or(self.session)
            .unwrap_or_else(SessionId::generate);
        if self.writer.is_none() || self.session != Some(id) {
            self.open_writer(id)?;
        }
        if let Some(writer) = self.writer.as_mut() {
            for record in items {
                let obs = &record.observation;
                let (prefix, item, serial, gtin, urn) = match &record.epc {
                    Some(epc) => (
                        epc.company_prefix.clone(),
                        epc.item_reference.clone(),
                        epc.serial_number.to_string(),
                        epc.gtin14.clone(),
                        epc.id_urn.clone(),
                    ),
                    None => Default::default(),
                };
                writer
                    .write_record(&[
                        obs.observed_at.to_rfc3339(),
                        obs.identifier.clone(),
                        obs.tag_id.clone().unwrap_or_default(),
                        obs.rssi.map(|v| v.to_string()).unwrap_or_default(),
                        prefix,
                        item,
                        serial,
                        gtin,
                        urn,
                    ])
                    .map_err(|e| RfidError::Storage(e.to_string()))?;
            }
            writer
                .flush()
                .map_err(|e| RfidError::Storage(e.to_string()))?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epc;
    use crate::observation::{DecodedFields, TagObservation};

    fn storage_in(dir: &std::path::Path) -> StorageSettings {
        StorageSettings {
            default_path: dir.to_string_lossy().into_owned(),
            default_format: "csv".into(),
        }
    }

    fn decoded_record(hex: &str) -> TagRecord {
        let fields = epc::decode(hex).map(DecodedFields::from).ok();
        TagRecord {
            observation: TagObservation::new(hex),
            epc: fields,
        }
    }

    #[tokio::test]
    async fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(&storage_in(dir.path()));
        let session = sink
            .persist(None, &[decoded_record("3074257BF7194E4000001A85")])
            .await
            .unwrap();

        let path = dir.path().join(format!("inventory_{session}.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("observed_at,identifier"));
        let row = lines.next().unwrap();
        assert!(row.contains("3074257BF7194E4000001A85"));
        assert!(row.contains("0614141"));
        assert!(row.contains("urn:epc:id:sgtin:0614141.812345.6789"));
    }

    #[tokio::test]
    async fn appends_across_batches_of_one_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(&storage_in(dir.path()));
        let session = sink
            .persist(None, &[decoded_record("3074257BF7194E4000001A85")])
            .await
            .unwrap();
        sink.persist(Some(session), &[decoded_record("3074257BF7194E4000001A86")])
            .await
            .unwrap();

        let path = sink.path().unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 3); // header + 2 rows
    }

    #[tokio::test]
    async fn undecodable_identifier_still_gets_a_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(&storage_in(dir.path()));
        let record = TagRecord {
            observation: TagObservation::new("DEADBEEF"),
            epc: None,
        };
        let session = sink.persist(None, &[record]).await.unwrap();

        let path = dir.path().join(format!("inventory_{session}.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("DEADBEEF"));
    }
}
