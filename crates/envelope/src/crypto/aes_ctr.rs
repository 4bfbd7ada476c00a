//! AES-CTR provider with tagged, rotatable keys.
//!
//! Body format:
//!
//! ```text
//! KeyTag (1) || IV (16) || ciphertext (len = plaintext len)
//! ```
//!
//! No padding and no authentication tag: the output is invertible, not
//! tamper-evident.

use common::Result;
use tracing::debug;

use super::ctr::{generate_iv, CtrStream};
use super::CipherProvider;
use crate::codec::{frame_body, BodyHeader, BODY_HEADER_LEN};
use crate::keys::KeyRegistry;

/// [`CipherProvider`] backed by AES in CTR mode.
#[derive(Debug, Clone)]
pub struct AesCtrProvider {
    keys: KeyRegistry,
}

impl AesCtrProvider {
    /// Provider encrypting under the keys of `keys`.
    pub fn new(keys: KeyRegistry) -> Self {
        Self { keys }
    }

    /// Encrypt `plaintext` under the key tagged `key_tag`, or under the default
    /// key when `key_tag` is `None`.
    ///
    /// A fresh random IV is drawn for every call.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::KeyNotFound`](common::EnvelopeError::KeyNotFound) if `key_tag` is unknown.
    /// - [`EnvelopeError::NoDefaultKey`](common::EnvelopeError::NoDefaultKey) if `key_tag` is `None` and no key is default.
    /// - Any key-resolution error from [`KeyRegistry::resolve`].
    pub fn encrypt_with(&self, plaintext: &[u8], key_tag: Option<u8>) -> Result<Vec<u8>> {
        let entry = match key_tag {
            Some(tag) => self.keys.find(tag)?,
            None => self.keys.default_entry()?,
        };
        let key = self.keys.resolve(entry)?;
        let iv = generate_iv();
        let mut stream = CtrStream::init(key.as_bytes(), &iv)?;

        let mut out = frame_body(entry.tag, &iv, plaintext);
        stream.apply(&mut out[BODY_HEADER_LEN..]);
        debug!(key_tag = entry.tag, len = plaintext.len(), "aes-ctr encrypt");
        Ok(out)
    }
}

impl CipherProvider for AesCtrProvider {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with(plaintext, None)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let header = BodyHeader::parse(ciphertext)?;
        let entry = self.keys.find(header.key_tag)?;
        let key = self.keys.resolve(entry)?;

        let mut plaintext = header.body.to_vec();
        CtrStream::init(key.as_bytes(), &header.iv)?.apply(&mut plaintext);
        debug!(key_tag = entry.tag, len = plaintext.len(), "aes-ctr decrypt");
        Ok(plaintext)
    }

    fn version(&self) -> Result<Vec<u8>> {
        Ok(vec![self.keys.default_entry()?.tag])
    }
}
