//! Custom error types for the application.
//!
//! This module defines the primary error type, `RfidError`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures that can occur,
//! from EPC codec validation through storage I/O to actor-channel breakage.
//!
//! ## Error Hierarchy
//!
//! `RfidError` consolidates several error sources:
//!
//! - **`Config`**: Wraps errors from the `config` crate, typically related to
//!   file parsing or format issues in the configuration files.
//! - **`Configuration`**: Semantic errors in the configuration, such as values
//!   that parse but are logically invalid (e.g., a zero batch size). These
//!   are caught during the validation step.
//! - **`InvalidField` / `MalformedHex` / `UnknownPartition` /
//!   `UnexpectedHeader`**: Codec errors. Always surfaced synchronously to the
//!   caller of encode/decode, never silently coerced (a malformed identifier
//!   must be visible, not skipped).
//! - **`Io` / `Storage`**: File and persistence failures. A storage failure
//!   during a flush does not discard the batch; the actor re-merges it into
//!   the pending buffer and retries on the next trigger.
//! - **`ActorStopped`**: The ingestion actor's command channel is closed.
//!   Callers awaiting a flush or stop acknowledgement observe this instead of
//!   hanging.
//!
//! Backpressure drops and duplicate observations are deliberately *not*
//! errors; they are counted outcomes exposed through the pipeline counters.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, RfidError>;

/// Unified error type for the ingestion pipeline and EPC codec.
#[derive(Error, Debug)]
pub enum RfidError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("Malformed EPC hex: expected 24 hex characters, got {0} after cleaning")]
    MalformedHex(usize),

    #[error("Unknown SGTIN-96 partition selector: {0}")]
    UnknownPartition(u8),

    #[error("Unexpected EPC header: expected 0x30, got {0:#04x}")]
    UnexpectedHeader(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Ingestion actor stopped; command channel closed")]
    ActorStopped,

    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

impl RfidError {
    /// Shorthand for a codec field-validation failure.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        RfidError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_names_the_offender() {
        let err = RfidError::invalid_field("serialNumber", "exceeds 38 bits");
        assert_eq!(err.to_string(), "Invalid serialNumber: exceeds 38 bits");
    }

    #[test]
    fn header_error_formats_hex() {
        let err = RfidError::UnexpectedHeader(0x35);
        assert!(err.to_string().contains("0x35"));
    }
}
