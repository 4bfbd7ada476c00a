//! Envelope framing.
//!
//! ```text
//! ModuleTag (variable) || KeyTag (1) || IV (16) || Body (len = plaintext len)
//! ```
//!
//! The module tag is owned by the [`CipherRegistry`](crate::CipherRegistry);
//! everything after it is the provider body, parsed here by [`BodyHeader`].

use common::{EnvelopeError, Result};

/// Byte length of the key tag.
pub const KEY_TAG_LEN: usize = 1;

/// Byte length of the IV (one AES block).
pub const IV_LEN: usize = 16;

/// Fixed header that precedes every provider body.
pub const BODY_HEADER_LEN: usize = KEY_TAG_LEN + IV_LEN;

/// A provider body split into its header fields and the encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyHeader<'a> {
    /// Tag of the key that produced `body`.
    pub key_tag: u8,
    /// IV the stream was initialised with.
    pub iv: [u8; IV_LEN],
    /// Ciphertext, same length as the original plaintext.
    pub body: &'a [u8],
}

impl<'a> BodyHeader<'a> {
    /// Split `input` into key tag, IV and body.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MalformedCiphertext`] if `input` is shorter
    /// than [`BODY_HEADER_LEN`].
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        if input.len() < BODY_HEADER_LEN {
            return Err(EnvelopeError::MalformedCiphertext { len: input.len() });
        }
        let (header, body) = input.split_at(BODY_HEADER_LEN);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&header[KEY_TAG_LEN..]);
        Ok(Self {
            key_tag: header[0],
            iv,
            body,
        })
    }
}

/// Build `key_tag || iv || payload`.
///
/// The payload is copied verbatim; callers transform it in place afterwards
/// via `out[BODY_HEADER_LEN..]`.
pub fn frame_body(key_tag: u8, iv: &[u8; IV_LEN], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(BODY_HEADER_LEN + payload.len());
    out.push(key_tag);
    out.extend_from_slice(iv);
    out.extend_from_slice(payload);
    out
}

/// Build `module_tag || body`.
pub fn prepend_module_tag(module_tag: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(module_tag.len() + body.len());
    out.extend_from_slice(module_tag);
    out.extend_from_slice(body);
    out
}

/// Return the bytes following `module_tag` if `input` starts with it.
pub fn strip_module_tag<'a>(module_tag: &[u8], input: &'a [u8]) -> Option<&'a [u8]> {
    input.strip_prefix(module_tag)
}
