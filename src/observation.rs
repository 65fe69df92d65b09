//! Tag observation and persisted-record types.

use crate::epc::Epc;
use serde::{Deserialize, Serialize};

/// A single raw tag read delivered by the scanning device.
///
/// Immutable once created. `identifier` is the hex-encoded EPC and serves as
/// the deduplication key; it is normalized to uppercase on construction so
/// readers that report lowercase hex do not defeat the dedup set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagObservation {
    /// Hex-encoded EPC, uppercase. The dedup key.
    pub identifier: String,
    /// Reader-assigned tag id, when the device reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    /// Received signal strength in dBm, when the device reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i16>,
    /// Device-side read timestamp.
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl TagObservation {
    /// Creates an observation read "now", normalizing the identifier case.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into().to_uppercase(),
            tag_id: None,
            rssi: None,
            observed_at: chrono::Utc::now(),
        }
    }

    /// Attaches the reader-assigned tag id.
    #[must_use]
    pub fn with_tag_id(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    /// Attaches the signal strength.
    #[must_use]
    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }
}

/// The persisted form of an observation, carrying the decoded SGTIN fields
/// when the identifier decodes cleanly.
///
/// Built by the actor at flush time. An identifier that fails SGTIN decode
/// still produces a record (raw fields only, `epc` empty) so corrupt data
/// reaches storage visibly instead of being skipped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagRecord {
    /// The raw observation as received.
    pub observation: TagObservation,
    /// Decoded identifier fields, absent when decoding failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epc: Option<DecodedFields>,
}

/// The subset of [`Epc`] fields worth persisting alongside the raw read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecodedFields {
    /// GS1 company prefix, zero-padded.
    pub company_prefix: String,
    /// Item reference, zero-padded.
    pub item_reference: String,
    /// 38-bit serial number.
    pub serial_number: u64,
    /// Derived GTIN-14.
    pub gtin14: String,
    /// Pure-identity URN.
    pub id_urn: String,
}

impl From<Epc> for DecodedFields {
    fn from(epc: Epc) -> Self {
        Self {
            company_prefix: epc.company_prefix,
            item_reference: epc.item_reference,
            serial_number: epc.serial_number,
            gtin14: epc.gtin14,
            id_urn: epc.id_urn,
        }
    }
}
