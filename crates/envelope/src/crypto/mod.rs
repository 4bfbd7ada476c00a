//! Cipher providers and the stream primitive they are built on.
//!
//! A provider owns the body of an envelope (everything after the module tag)
//! and is free to frame it however it likes, as long as its `decrypt` can
//! invert its own `encrypt` without outside metadata.

pub mod aes_ctr;
pub mod ctr;

pub use aes_ctr::AesCtrProvider;

use common::Result;

/// A cipher implementation that can be registered under a module tag.
#[cfg_attr(test, mockall::automock)]
pub trait CipherProvider: Send + Sync {
    /// Encrypt `plaintext` with the provider's default key.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Invert [`CipherProvider::encrypt`] on a body with the module tag removed.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Identify the key new ciphertexts would be produced with.
    fn version(&self) -> Result<Vec<u8>>;
}
