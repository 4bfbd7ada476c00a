//! External sources for indirect key material.

/// Looks up the current value of an indirect key by source id.
///
/// Implementations are read on every encrypt/decrypt that needs the key, so
/// rotating the underlying secret takes effect without rebuilding any
/// registry. Values are expected to be base64-encoded.
#[cfg_attr(test, mockall::automock)]
pub trait KeySource: Send + Sync {
    /// Returns the current value for `id`, or `None` when it is unset.
    fn fetch(&self, id: &str) -> Option<String>;
}

/// Reads indirect key material from process environment variables.
///
/// Writes to the environment from other threads while a call is in flight
/// are not serialised against; sources are expected to change between bursts
/// of calls, not during them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvKeySource;

impl KeySource for EnvKeySource {
    fn fetch(&self, id: &str) -> Option<String> {
        std::env::var(id).ok()
    }
}
