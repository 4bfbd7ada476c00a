//! [`CipherRegistry`]: module-tag dispatch over the configured providers.
//!
//! Matching is by byte prefix, first match in registration order. It is not
//! longest-match: with tags `"A"` and `"AB"` registered in that order, a
//! ciphertext starting `"AB..."` is handed to the `"A"` provider.

use std::sync::Arc;

use common::{EnvelopeError, Result};
use tracing::{debug, warn};

use crate::codec::{prepend_module_tag, strip_module_tag};
use crate::crypto::CipherProvider;

/// A provider registered under a module tag.
#[derive(Clone)]
pub struct CipherEntry {
    tag: Vec<u8>,
    provider: Arc<dyn CipherProvider>,
    is_default: bool,
}

impl CipherEntry {
    /// Register `provider` under module tag `tag`.
    pub fn new(
        tag: impl Into<Vec<u8>>,
        provider: impl CipherProvider + 'static,
        is_default: bool,
    ) -> Self {
        Self::shared(tag, Arc::new(provider), is_default)
    }

    /// Register a provider that is also held elsewhere.
    pub fn shared(
        tag: impl Into<Vec<u8>>,
        provider: Arc<dyn CipherProvider>,
        is_default: bool,
    ) -> Self {
        Self {
            tag: tag.into(),
            provider,
            is_default,
        }
    }

    /// Module tag prefixed to every ciphertext this entry produces.
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// Whether this entry may be picked for encryption.
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

impl std::fmt::Debug for CipherEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherEntry")
            .field("tag", &String::from_utf8_lossy(&self.tag))
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

/// Immutable, ordered set of cipher entries.
///
/// Cheap to clone; every clone shares the same entries. Build one at startup
/// and hand it to every call site.
#[derive(Clone, Debug)]
pub struct CipherRegistry {
    entries: Arc<[CipherEntry]>,
}

impl CipherRegistry {
    /// Build a registry; `entries` order is the dispatch order.
    pub fn new(entries: Vec<CipherEntry>) -> Self {
        let defaults = entries.iter().filter(|e| e.is_default).count();
        if defaults > 1 {
            warn!(
                defaults,
                "several ciphers flagged default; the first registered is used"
            );
        }
        Self {
            entries: entries.into(),
        }
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[CipherEntry] {
        &self.entries
    }

    fn default_entry(&self) -> Result<&CipherEntry> {
        self.entries
            .iter()
            .find(|e| e.is_default)
            .ok_or(EnvelopeError::NoDefaultCipher)
    }

    /// Encrypt with the default cipher and prefix its module tag.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::NoDefaultCipher`] if no entry is flagged
    /// default, or any error from the provider.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let entry = self.default_entry()?;
        let body = entry.provider.encrypt(plaintext)?;
        Ok(prepend_module_tag(&entry.tag, &body))
    }

    /// Decrypt with the first cipher whose module tag prefixes `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::CipherNotFound`] if no module tag matches, or
    /// any error from the selected provider. No other provider is tried after
    /// the first match fails.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let (entry, body) = self
            .entries
            .iter()
            .find_map(|e| strip_module_tag(&e.tag, ciphertext).map(|body| (e, body)))
            .ok_or(EnvelopeError::CipherNotFound)?;
        debug!(tag_len = entry.tag.len(), "dispatching decrypt");
        entry.provider.decrypt(body)
    }

    /// `default module tag || default provider version`.
    ///
    /// Persist this next to each value to know later which cipher and key
    /// produced it.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::NoDefaultCipher`] if no entry is flagged
    /// default, or the provider's version error.
    pub fn version(&self) -> Result<Vec<u8>> {
        let entry = self.default_entry()?;
        let provider_version = entry.provider.version()?;
        Ok(prepend_module_tag(&entry.tag, &provider_version))
    }
}
