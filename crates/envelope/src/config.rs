//! Cipher configuration schema and registry construction.
//!
//! ```toml
//! [[ciphers]]
//! tag = "AES.CTR.V1"
//! default = true
//! provider = "aes_ctr"
//!
//! [[ciphers.keys]]
//! tag = 1
//! key = "<base64, 16/24/32 bytes>"
//!
//! [[ciphers.keys]]
//! tag = 2
//! key = { source = "ENVELOPE_KEY_2" }
//! default = true
//! ```
//!
//! A module tag that is not valid UTF-8 is written as `tag = { base64 = "..." }`.
//!
//! Literal keys are decoded and size-checked here, once. `source` keys are
//! resolved on every use and so can only fail at call time.

use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::EnvelopeError;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::crypto::ctr::check_key_size;
use crate::crypto::AesCtrProvider;
use crate::keys::{KeyEntry, KeyRegistry, KeySource};
use crate::registry::{CipherEntry, CipherRegistry};

/// Errors raised while loading configuration or building a registry from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration could not be read or deserialised.
    #[error("failed to load cipher configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A `base64` module tag could not be decoded.
    #[error("cipher tag {tag:?} is not valid base64")]
    InvalidTag { tag: String },

    /// A literal key failed validation.
    #[error("cipher {cipher:?} key {key_tag}: {source}")]
    InvalidKey {
        cipher: String,
        key_tag: u8,
        #[source]
        source: EnvelopeError,
    },
}

/// Top-level cipher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeConfig {
    /// Ciphers in registration order.
    pub ciphers: Vec<CipherConfig>,
}

/// One cipher entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CipherConfig {
    /// Module tag written at the front of each ciphertext.
    pub tag: TagSpec,

    #[serde(default)]
    pub default: bool,

    pub provider: ProviderKind,

    /// Keys for the provider, in registration order.
    #[serde(default)]
    pub keys: Vec<KeyConfig>,
}

/// Module tag bytes: UTF-8 text, or base64 for arbitrary bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagSpec {
    Text(String),
    Base64 { base64: String },
}

impl TagSpec {
    /// Raw tag bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTag`] if a `base64` tag does not decode.
    pub fn bytes(&self) -> Result<Vec<u8>, ConfigError> {
        match self {
            TagSpec::Text(text) => Ok(text.as_bytes().to_vec()),
            TagSpec::Base64 { base64 } => STANDARD
                .decode(base64.as_bytes())
                .map_err(|_| ConfigError::InvalidTag { tag: base64.clone() }),
        }
    }

    /// The tag as written in configuration, for error messages.
    fn label(&self) -> &str {
        match self {
            TagSpec::Text(text) => text,
            TagSpec::Base64 { base64 } => base64,
        }
    }
}

/// Which provider implementation backs a cipher entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    AesCtr,
}

/// One key of a provider.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyConfig {
    pub tag: u8,
    pub key: KeySpec,
    #[serde(default)]
    pub default: bool,
}

/// Key material: an inline base64 string or an external source id.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Literal(String),
    Source { source: String },
}

impl std::fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySpec::Literal(_) => f.write_str("Literal([REDACTED])"),
            KeySpec::Source { source } => f.debug_struct("Source").field("source", source).finish(),
        }
    }
}

impl EnvelopeConfig {
    /// Load from a TOML or JSON file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file is missing or malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(config::File::from(path.as_ref()))
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Self::load(config::File::from_str(text, config::FileFormat::Toml))
    }

    /// Parse JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::load(config::File::from_str(text, config::FileFormat::Json))
    }

    fn load<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let cfg = config::Config::builder().add_source(source).build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Build the cipher registry. Indirect keys are read from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTag`] if a `base64` module tag does not
    /// decode, or [`ConfigError::InvalidKey`] if a literal key is not base64 or
    /// not 16, 24 or 32 bytes long.
    pub fn build(&self, source: Arc<dyn KeySource>) -> Result<CipherRegistry, ConfigError> {
        let mut entries = Vec::with_capacity(self.ciphers.len());
        for cipher in &self.ciphers {
            let tag = cipher.tag.bytes()?;
            let provider = match cipher.provider {
                ProviderKind::AesCtr => {
                    let keys = cipher
                        .keys
                        .iter()
                        .map(|k| k.to_entry(cipher.tag.label()))
                        .collect::<Result<Vec<_>, _>>()?;
                    AesCtrProvider::new(KeyRegistry::with_source(keys, source.clone()))
                }
            };
            entries.push(CipherEntry::new(tag, provider, cipher.default));
        }
        info!(ciphers = entries.len(), "cipher registry built");
        Ok(CipherRegistry::new(entries))
    }
}

impl KeyConfig {
    fn to_entry(&self, cipher: &str) -> Result<KeyEntry, ConfigError> {
        match &self.key {
            KeySpec::Source { source } => Ok(KeyEntry::indirect(self.tag, source, self.default)),
            KeySpec::Literal(encoded) => {
                let invalid = |source| ConfigError::InvalidKey {
                    cipher: cipher.to_owned(),
                    key_tag: self.tag,
                    source,
                };
                let key = STANDARD.decode(encoded.as_bytes()).map_err(|_| {
                    invalid(EnvelopeError::InvalidKeyEncoding(format!("key {}", self.tag)))
                })?;
                check_key_size(key.len()).map_err(invalid)?;
                Ok(KeyEntry::literal(self.tag, key, self.default))
            }
        }
    }
}
