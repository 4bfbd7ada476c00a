//! Error kinds shared across crates.

use thiserror::Error;

/// Every way an envelope operation can fail.
///
/// None of these are transient: a failed call is never retried and never falls
/// back to a different cipher or key. Callers match on the variant rather than
/// on the message text; [`EnvelopeError::code`] gives a stable string form for
/// reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// No configured module tag is a prefix of the ciphertext.
    #[error("no configured cipher matches the ciphertext")]
    CipherNotFound,

    /// The key tag embedded in the ciphertext (or requested explicitly) has no
    /// matching key entry.
    #[error("no key configured for tag {0}")]
    KeyNotFound(u8),

    /// Encryption was requested but no cipher entry is flagged default.
    #[error("no default cipher configured")]
    NoDefaultCipher,

    /// Encryption was requested without a key tag and no key is flagged default.
    #[error("no default key configured")]
    NoDefaultKey,

    /// The ciphertext body is shorter than the fixed key-tag + IV header.
    #[error("malformed ciphertext: {len} bytes is shorter than the envelope header")]
    MalformedCiphertext {
        /// Length of the rejected input.
        len: usize,
    },

    /// Indirect key material points at a source that is unset or empty.
    #[error("key source {0:?} is missing or empty")]
    MissingKeySource(String),

    /// Key material is not valid base64.
    #[error("key material from {0:?} is not valid base64")]
    InvalidKeyEncoding(String),

    /// Resolved key material is not 128, 192 or 256 bits.
    #[error("invalid key size: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeySize(usize),
}

impl EnvelopeError {
    /// Returns a short machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            EnvelopeError::CipherNotFound => "cipher_not_found",
            EnvelopeError::KeyNotFound(_) => "key_not_found",
            EnvelopeError::NoDefaultCipher => "no_default_cipher",
            EnvelopeError::NoDefaultKey => "no_default_key",
            EnvelopeError::MalformedCiphertext { .. } => "malformed_ciphertext",
            EnvelopeError::MissingKeySource(_) => "missing_key_source",
            EnvelopeError::InvalidKeyEncoding(_) => "invalid_key_encoding",
            EnvelopeError::InvalidKeySize(_) => "invalid_key_size",
        }
    }
}

/// Convenience alias used throughout the envelope crates.
pub type Result<T, E = EnvelopeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            EnvelopeError::CipherNotFound,
            EnvelopeError::KeyNotFound(1),
            EnvelopeError::NoDefaultCipher,
            EnvelopeError::NoDefaultKey,
            EnvelopeError::MalformedCiphertext { len: 3 },
            EnvelopeError::MissingKeySource("K".into()),
            EnvelopeError::InvalidKeyEncoding("K".into()),
            EnvelopeError::InvalidKeySize(7),
        ];
        let mut codes: Vec<_> = all.iter().map(EnvelopeError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn display_includes_detail() {
        assert!(EnvelopeError::KeyNotFound(9).to_string().contains('9'));
        assert!(EnvelopeError::InvalidKeySize(12).to_string().contains("12"));
        let e = EnvelopeError::MissingKeySource("ENVELOPE_KEY_2".into());
        assert!(e.to_string().contains("ENVELOPE_KEY_2"));
    }
}
