//! Key entries, key lookup and indirect key-material resolution.
//!
//! # Rotation
//!
//! To introduce a new key, append an entry flagged default and clear the flag
//! on the previous one. New ciphertexts carry the new tag; old ciphertexts
//! still resolve through their embedded tag. An entry must stay configured
//! for as long as any stored ciphertext references it.

pub mod registry;
pub mod source;

pub use registry::{KeyBytes, KeyEntry, KeyMaterial, KeyRegistry};
pub use source::{EnvKeySource, KeySource};
