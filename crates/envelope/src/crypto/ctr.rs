//! AES in CTR mode, keyed by 128, 192 or 256-bit material.
//!
//! The counter block is the full 128-bit IV incremented big-endian, so a
//! ciphertext produced here can be inverted by any standard `aes-*-ctr`
//! implementation given the same key and IV.
//!
//! **Never reuse an IV under the same key.** Two messages sharing a keystream
//! XOR to the XOR of their plaintexts. [`generate_iv`] draws every IV from the
//! OS CSPRNG; no counter is kept because callers share no state.

use aes::{Aes128, Aes192, Aes256};
use common::{EnvelopeError, Result};
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use rand::{rngs::OsRng, RngCore};

use crate::codec::IV_LEN;

/// Key lengths accepted by [`CtrStream::init`].
pub const KEY_LENS: [usize; 3] = [16, 24, 32];

/// Keystream state for one message.
pub enum CtrStream {
    Aes128(Ctr128BE<Aes128>),
    Aes192(Ctr128BE<Aes192>),
    Aes256(Ctr128BE<Aes256>),
}

impl CtrStream {
    /// Initialise a keystream from `key` and `iv`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKeySize`] unless `key` is 16, 24 or
    /// 32 bytes.
    pub fn init(key: &[u8], iv: &[u8; IV_LEN]) -> Result<Self> {
        let bad_size = |_| EnvelopeError::InvalidKeySize(key.len());
        let stream = match key.len() {
            16 => Self::Aes128(Ctr128BE::new_from_slices(key, iv).map_err(bad_size)?),
            24 => Self::Aes192(Ctr128BE::new_from_slices(key, iv).map_err(bad_size)?),
            32 => Self::Aes256(Ctr128BE::new_from_slices(key, iv).map_err(bad_size)?),
            n => return Err(EnvelopeError::InvalidKeySize(n)),
        };
        Ok(stream)
    }

    /// XOR the keystream into `buf`. Encryption and decryption are the same call.
    pub fn apply(&mut self, buf: &mut [u8]) {
        match self {
            Self::Aes128(c) => c.apply_keystream(buf),
            Self::Aes192(c) => c.apply_keystream(buf),
            Self::Aes256(c) => c.apply_keystream(buf),
        }
    }
}

impl std::fmt::Debug for CtrStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = match self {
            Self::Aes128(_) => 128,
            Self::Aes192(_) => 192,
            Self::Aes256(_) => 256,
        };
        write!(f, "CtrStream(aes-{bits}-ctr)")
    }
}

/// Returns `Ok(())` if `len` is a valid AES key length.
pub fn check_key_size(len: usize) -> Result<()> {
    if KEY_LENS.contains(&len) {
        Ok(())
    } else {
        Err(EnvelopeError::InvalidKeySize(len))
    }
}

/// Draw a fresh IV from the OS CSPRNG.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}
