//! Redb-backed storage backend.
//!
//! Persists the consent entry to a file with ACID guarantees, for hosts
//! that embed the consent core outside a browser (desktop webviews, kiosk
//! builds, test harnesses that simulate reloads).

use super::backend::StorageBackend;
use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Table holding consent entries.
pub(crate) const CONSENT_TABLE: TableDefinition<'static, &'static str, &'static str> =
    TableDefinition::new("consent");

/// Redb-backed key-value storage backend.
///
/// `Clone` shares the open database handle.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Opens or creates a redb database at the given path.
    ///
    /// Creates parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory cannot be created
    /// - Database file cannot be opened or created
    /// - Initialization transaction fails to begin or commit
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create consent directory: {}", parent.display())
            })?;
        }

        let db = Database::create(path)
            .with_context(|| format!("Failed to open consent database: {}", path.display()))?;

        // Create the table up front so reads on a fresh file don't fail
        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        {
            let _table = write_txn
                .open_table(CONSENT_TABLE)
                .context("Failed to initialize consent table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StorageBackend for RedbBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;

        let table = read_txn
            .open_table(CONSENT_TABLE)
            .context("Failed to open consent table")?;

        let value = table
            .get(key)
            .with_context(|| format!("Failed to read key '{key}'"))?
            .map(|guard| guard.value().to_string());

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        {
            let mut table = write_txn
                .open_table(CONSENT_TABLE)
                .context("Failed to open consent table")?;

            table
                .insert(key, value)
                .with_context(|| format!("Failed to insert key '{key}'"))?;
        }

        write_txn
            .commit()
            .context("Failed to commit set transaction")?;

        Ok(())
    }
}
