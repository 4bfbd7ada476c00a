//! Error kinds and stored-record types shared across the envelope crates.

pub mod error;
pub mod protocol;

pub use error::{EnvelopeError, Result};
