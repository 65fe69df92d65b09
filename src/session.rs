//! Inventory-session identity.
//!
//! A session groups the batches flushed during one run of the ingestion
//! actor. The id is created lazily: if the caller did not supply one, the
//! persistence sink mints it on the first flush and the actor pins it for
//! the rest of its lifetime, so every subsequent batch lands under the same
//! session.

use uuid::Uuid;

/// Opaque inventory-session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mints a fresh session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
