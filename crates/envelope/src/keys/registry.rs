//! [`KeyRegistry`]: the ordered key entries of one cipher provider.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{EnvelopeError, Result};
use tracing::debug;

use super::source::{EnvKeySource, KeySource};
use crate::crypto::ctr::check_key_size;

/// Owned key bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// shorten the time plaintext key material lives in RAM.
#[derive(Clone)]
pub struct KeyBytes(Vec<u8>);

impl KeyBytes {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key bytes are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for KeyBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// Where a key's bytes come from.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// Raw key bytes fixed at configuration time.
    Literal(KeyBytes),
    /// Base64 value read from a [`KeySource`] under this id on every use.
    Indirect(String),
}

/// One configured key.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    /// One-byte tag written into every ciphertext this key produces.
    pub tag: u8,
    pub material: KeyMaterial,
    /// Whether new encryptions use this key when no tag is requested.
    pub is_default: bool,
}

impl KeyEntry {
    /// A key whose bytes are given directly.
    pub fn literal(tag: u8, key: impl Into<Vec<u8>>, is_default: bool) -> Self {
        Self {
            tag,
            material: KeyMaterial::Literal(KeyBytes::new(key)),
            is_default,
        }
    }

    /// A key resolved from `source_id` each time it is used.
    pub fn indirect(tag: u8, source_id: impl Into<String>, is_default: bool) -> Self {
        Self {
            tag,
            material: KeyMaterial::Indirect(source_id.into()),
            is_default,
        }
    }
}

/// Ordered, immutable collection of [`KeyEntry`] values.
///
/// Lookups are first-match in registration order. Duplicate tags or several
/// default entries are not rejected; the earliest entry always wins.
#[derive(Clone)]
pub struct KeyRegistry {
    entries: Vec<KeyEntry>,
    source: Arc<dyn KeySource>,
}

impl KeyRegistry {
    /// Build a registry whose indirect keys are read from the environment.
    pub fn new(entries: Vec<KeyEntry>) -> Self {
        Self::with_source(entries, Arc::new(EnvKeySource))
    }

    /// Build a registry whose indirect keys are read from `source`.
    pub fn with_source(entries: Vec<KeyEntry>, source: Arc<dyn KeySource>) -> Self {
        Self { entries, source }
    }

    /// Find the first entry carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::KeyNotFound`] if no entry has that tag.
    pub fn find(&self, tag: u8) -> Result<&KeyEntry> {
        self.entries
            .iter()
            .find(|e| e.tag == tag)
            .ok_or(EnvelopeError::KeyNotFound(tag))
    }

    /// Return the first entry flagged default.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::NoDefaultKey`] if no entry is flagged.
    pub fn default_entry(&self) -> Result<&KeyEntry> {
        self.entries
            .iter()
            .find(|e| e.is_default)
            .ok_or(EnvelopeError::NoDefaultKey)
    }

    /// Produce the key bytes for `entry`.
    ///
    /// Literal material is returned as-is. Indirect material is fetched from
    /// the source and base64-decoded on every call; nothing is cached.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MissingKeySource`] if the source value is unset or empty.
    /// - [`EnvelopeError::InvalidKeyEncoding`] if it is not valid base64.
    /// - [`EnvelopeError::InvalidKeySize`] if the bytes are not 16, 24 or 32 long.
    pub fn resolve(&self, entry: &KeyEntry) -> Result<KeyBytes> {
        let key = match &entry.material {
            KeyMaterial::Literal(bytes) => bytes.clone(),
            KeyMaterial::Indirect(id) => {
                let encoded = self
                    .source
                    .fetch(id)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| EnvelopeError::MissingKeySource(id.clone()))?;
                let decoded = STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|_| EnvelopeError::InvalidKeyEncoding(id.clone()))?;
                debug!(key_tag = entry.tag, source = %id, "resolved indirect key material");
                KeyBytes::new(decoded)
            }
        };
        check_key_size(key.len())?;
        Ok(key)
    }
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::source::MockKeySource;

    fn source_returning(value: Option<&'static str>) -> Arc<dyn KeySource> {
        let mut source = MockKeySource::new();
        source
            .expect_fetch()
            .returning(move |_| value.map(str::to_owned));
        Arc::new(source)
    }

    #[test]
    fn find_returns_first_match() {
        let keys = KeyRegistry::new(vec![
            KeyEntry::literal(1, [0x11; 16], false),
            KeyEntry::literal(1, [0x22; 16], false),
            KeyEntry::literal(2, [0x33; 16], true),
        ]);
        let entry = keys.find(1).unwrap();
        assert_eq!(keys.resolve(entry).unwrap().as_bytes(), &[0x11; 16]);
        assert_eq!(keys.find(9).unwrap_err(), EnvelopeError::KeyNotFound(9));
    }

    #[test]
    fn default_is_first_flagged() {
        let keys = KeyRegistry::new(vec![
            KeyEntry::literal(1, [0x11; 16], false),
            KeyEntry::literal(2, [0x22; 16], true),
            KeyEntry::literal(3, [0x33; 16], true),
        ]);
        assert_eq!(keys.default_entry().unwrap().tag, 2);
    }

    #[test]
    fn no_default_key() {
        let keys = KeyRegistry::new(vec![KeyEntry::literal(1, [0x11; 16], false)]);
        assert_eq!(keys.default_entry().unwrap_err(), EnvelopeError::NoDefaultKey);
    }

    #[test]
    fn literal_with_bad_size_fails_on_resolve() {
        let keys = KeyRegistry::new(vec![KeyEntry::literal(1, [0x11; 20], true)]);
        let entry = keys.default_entry().unwrap();
        assert_eq!(keys.resolve(entry).unwrap_err(), EnvelopeError::InvalidKeySize(20));
    }

    #[test]
    fn indirect_decodes_base64() {
        // 32 bytes of 0x00.
        let keys = KeyRegistry::with_source(
            vec![KeyEntry::indirect(1, "KEY", true)],
            source_returning(Some("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=")),
        );
        let key = keys.resolve(keys.find(1).unwrap()).unwrap();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn indirect_missing_or_empty() {
        for value in [None, Some("")] {
            let keys = KeyRegistry::with_source(
                vec![KeyEntry::indirect(1, "KEY", true)],
                source_returning(value),
            );
            let err = keys.resolve(keys.find(1).unwrap()).unwrap_err();
            assert_eq!(err, EnvelopeError::MissingKeySource("KEY".into()));
        }
    }

    #[test]
    fn indirect_bad_encoding() {
        let keys = KeyRegistry::with_source(
            vec![KeyEntry::indirect(1, "KEY", true)],
            source_returning(Some("not base64!")),
        );
        let err = keys.resolve(keys.find(1).unwrap()).unwrap_err();
        assert_eq!(err, EnvelopeError::InvalidKeyEncoding("KEY".into()));
    }

    #[test]
    fn indirect_bad_size() {
        // 3 bytes.
        let keys = KeyRegistry::with_source(
            vec![KeyEntry::indirect(1, "KEY", true)],
            source_returning(Some("AAAA")),
        );
        let err = keys.resolve(keys.find(1).unwrap()).unwrap_err();
        assert_eq!(err, EnvelopeError::InvalidKeySize(3));
    }

    #[test]
    fn indirect_is_fetched_on_every_resolve() {
        let mut source = MockKeySource::new();
        source
            .expect_fetch()
            .times(3)
            .returning(|id| {
                assert_eq!(id, "ROTATING");
                Some("AAAAAAAAAAAAAAAAAAAAAA==".to_owned())
            });
        let keys = KeyRegistry::with_source(
            vec![KeyEntry::indirect(4, "ROTATING", true)],
            Arc::new(source),
        );
        let entry = keys.default_entry().unwrap();
        for _ in 0..3 {
            assert_eq!(keys.resolve(entry).unwrap().len(), 16);
        }
    }

    #[test]
    fn key_bytes_redacted_in_debug() {
        let key = KeyBytes::new(vec![0xFF; 16]);
        assert!(format!("{key:?}").contains("REDACTED"));
        assert_eq!((key.len(), key.is_empty()), (16, false));
        assert!(KeyBytes::new(Vec::new()).is_empty());
        let entry = KeyEntry::literal(1, [0xAB; 16], true);
        assert!(!format!("{entry:?}").contains("171"));
    }
}
