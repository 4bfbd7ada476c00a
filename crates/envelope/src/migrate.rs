//! Re-encrypting stored values under the current default cipher and key.
//!
//! The ciphertext is self-describing, so decryption always follows its own
//! tags; the recorded version is only consulted to skip records that are
//! already current.

use common::protocol::StoredRecord;
use common::Result;

use crate::registry::CipherRegistry;

/// Result of migrating one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// Re-encrypted; persist the new record.
    Migrated(StoredRecord),
    /// Recorded version already matches the registry; nothing to write.
    Current,
}

/// Applies the migration operation to stored records.
#[derive(Debug, Clone)]
pub struct Migrator {
    registry: CipherRegistry,
    skip_current: bool,
}

impl Migrator {
    /// A migrator that skips records whose version is already current.
    pub fn new(registry: CipherRegistry) -> Self {
        Self {
            registry,
            skip_current: true,
        }
    }

    /// Re-encrypt every record, even those already at the current version.
    pub fn skip_current(mut self, skip: bool) -> Self {
        self.skip_current = skip;
        self
    }

    /// Decrypt `record` through its embedded tags and re-encrypt it with the
    /// registry default.
    ///
    /// Running this again on its own output yields [`Migration::Current`], or
    /// another equivalent ciphertext when skipping is disabled.
    ///
    /// # Errors
    ///
    /// Any error from [`CipherRegistry::version`], [`CipherRegistry::decrypt`]
    /// or [`CipherRegistry::encrypt`].
    pub fn migrate(&self, record: &StoredRecord) -> Result<Migration> {
        let version = self.registry.version()?;
        if self.skip_current && record.version == version {
            return Ok(Migration::Current);
        }
        let plaintext = self.registry.decrypt(&record.ciphertext)?;
        let ciphertext = self.registry.encrypt(&plaintext)?;
        Ok(Migration::Migrated(StoredRecord {
            ciphertext,
            version,
        }))
    }
}

/// Running totals for a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub migrated: usize,
    pub current: usize,
    pub failed: usize,
}

impl MigrationSummary {
    /// Count one outcome.
    pub fn record<E>(&mut self, outcome: &std::result::Result<Migration, E>) {
        match outcome {
            Ok(Migration::Migrated(_)) => self.migrated += 1,
            Ok(Migration::Current) => self.current += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.migrated + self.current + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AesCtrProvider;
    use crate::keys::{KeyEntry, KeyRegistry};
    use crate::registry::CipherEntry;
    use common::EnvelopeError;

    fn registry(keys: Vec<KeyEntry>) -> CipherRegistry {
        CipherRegistry::new(vec![CipherEntry::new(
            &b"AES.CTR.V1"[..],
            AesCtrProvider::new(KeyRegistry::new(keys)),
            true,
        )])
    }

    fn stored(registry: &CipherRegistry, plaintext: &[u8]) -> StoredRecord {
        StoredRecord {
            ciphertext: registry.encrypt(plaintext).unwrap(),
            version: registry.version().unwrap(),
        }
    }

    #[test]
    fn migrates_to_new_default_key() {
        let old = registry(vec![KeyEntry::literal(1, [0x01; 16], true)]);
        let record = stored(&old, b"Hello, World!");

        let new = registry(vec![
            KeyEntry::literal(1, [0x01; 16], false),
            KeyEntry::literal(2, [0x02; 16], true),
        ]);
        let migrator = Migrator::new(new.clone());
        let Migration::Migrated(out) = migrator.migrate(&record).unwrap() else {
            panic!("expected a migrated record");
        };
        assert_eq!(out.version, b"AES.CTR.V1\x02");
        assert_eq!(out.ciphertext[b"AES.CTR.V1".len()], 2);
        assert_eq!(new.decrypt(&out.ciphertext).unwrap(), b"Hello, World!");

        // Second pass sees the record as current.
        assert_eq!(migrator.migrate(&out).unwrap(), Migration::Current);
    }

    #[test]
    fn re_encrypts_current_records_when_not_skipping() {
        let reg = registry(vec![KeyEntry::literal(1, [0x01; 16], true)]);
        let record = stored(&reg, b"again");
        let migrator = Migrator::new(reg.clone()).skip_current(false);
        let Migration::Migrated(out) = migrator.migrate(&record).unwrap() else {
            panic!("expected a migrated record");
        };
        assert_ne!(out.ciphertext, record.ciphertext);
        assert_eq!(out.version, record.version);
        assert_eq!(reg.decrypt(&out.ciphertext).unwrap(), b"again");
    }

    #[test]
    fn stale_version_label_is_ignored_for_decryption() {
        let reg = registry(vec![KeyEntry::literal(1, [0x01; 16], true)]);
        let mut record = stored(&reg, b"mislabelled");
        record.version = b"SOMETHING.ELSE".to_vec();
        let Migration::Migrated(out) = Migrator::new(reg.clone()).migrate(&record).unwrap() else {
            panic!("expected a migrated record");
        };
        assert_eq!(reg.decrypt(&out.ciphertext).unwrap(), b"mislabelled");
    }

    #[test]
    fn failure_is_reported() {
        let reg = registry(vec![KeyEntry::literal(1, [0x01; 16], true)]);
        let record = StoredRecord {
            ciphertext: b"UNKNOWN".to_vec(),
            version: vec![],
        };
        assert_eq!(
            Migrator::new(reg).migrate(&record).unwrap_err(),
            EnvelopeError::CipherNotFound
        );
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = MigrationSummary::default();
        summary.record::<EnvelopeError>(&Ok(Migration::Current));
        summary.record(&Err(EnvelopeError::NoDefaultKey));
        summary.record::<EnvelopeError>(&Ok(Migration::Migrated(StoredRecord {
            ciphertext: vec![],
            version: vec![],
        })));
        assert_eq!(
            summary,
            MigrationSummary {
                migrated: 1,
                current: 1,
                failed: 1
            }
        );
        assert_eq!(summary.total(), 3);
    }
}
