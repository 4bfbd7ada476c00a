//! Record types exchanged with the batch migration tool.
//!
//! Records travel as newline-delimited JSON. Binary fields (ciphertext and
//! version identifiers) are carried as standard padded base64 strings.

use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

// ---------------------------------------------------------------------------
// Stored values
// ---------------------------------------------------------------------------

/// A persisted ciphertext together with the `version()` recorded when it was
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Full envelope bytes: module tag, key tag, IV and body.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
    /// Version identifier stored next to the value.
    #[serde(with = "b64")]
    pub version: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Report emitted for an input record that could not be migrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    /// 1-based input line number.
    pub line: usize,
    /// Short machine-readable error code (e.g. `"key_not_found"`).
    pub code: String,
    /// Human-readable description. Never contains key material.
    pub message: String,
}

impl RecordFailure {
    /// Construct a [`RecordFailure`] from a code and message.
    pub fn new(line: usize, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Construct a [`RecordFailure`] describing an envelope error.
    pub fn from_envelope(line: usize, err: &EnvelopeError) -> Self {
        Self::new(line, err.code(), err.to_string())
    }
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
