//! Tag-dispatched encryption envelopes.
//!
//! Several ciphers and several keys per cipher can be valid at once. Every
//! ciphertext names the cipher and key that produced it, so a single
//! [`CipherRegistry::decrypt`] routes any stored value correctly while new
//! values are written with the current defaults.
//!
//! # Ciphertext format
//!
//! ```text
//! ModuleTag || KeyTag (1) || IV (16) || Body (len = plaintext len)
//! ```
//!
//! # Example
//!
//! ```
//! use envelope::{AesCtrProvider, CipherEntry, CipherRegistry, KeyEntry, KeyRegistry};
//!
//! let keys = KeyRegistry::new(vec![KeyEntry::literal(1, [7u8; 32], true)]);
//! let registry = CipherRegistry::new(vec![CipherEntry::new(
//!     &b"AES.CTR.V1"[..],
//!     AesCtrProvider::new(keys),
//!     true,
//! )]);
//!
//! let ct = registry.encrypt(b"4111 1111 1111 1111").unwrap();
//! assert_eq!(registry.decrypt(&ct).unwrap(), b"4111 1111 1111 1111");
//! assert_eq!(registry.version().unwrap(), b"AES.CTR.V1\x01");
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod keys;
pub mod migrate;
pub mod registry;

pub use common::{EnvelopeError, Result};
pub use config::{ConfigError, EnvelopeConfig};
pub use crypto::{AesCtrProvider, CipherProvider};
pub use keys::{EnvKeySource, KeyEntry, KeyRegistry, KeySource};
pub use migrate::{Migration, MigrationSummary, Migrator};
pub use registry::{CipherEntry, CipherRegistry};
