//! Persistent settings storage backed by the `lifex.settings` table.
//!
//! The core gate is synchronous, so reads and writes go to an in-memory
//! cache. Written keys are marked dirty and persisted by [`SettingsStorage::flush`]
//! once the request handler is back in async context. A change that cannot
//! be persisted is reverted, so the cache never holds a value the database
//! does not.

use std::collections::BTreeMap;

use lifex_core::{MemoryStorage, Storage, StorageError};
use parking_lot::Mutex;
use sqlx::PgPool;

use crate::db::{self, RepositoryError};

/// Settings cache with optional database persistence.
#[derive(Debug)]
pub struct SettingsStorage {
    cache: MemoryStorage,
    pool: Option<PgPool>,
    /// Changed keys, each with its last persisted value.
    dirty: Mutex<BTreeMap<String, Option<String>>>,
}

impl SettingsStorage {
    /// Settings kept in memory only. Changes are lost on restart.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_cache(MemoryStorage::new(), None)
    }

    /// Load every stored setting from the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be read.
    pub async fn load(pool: PgPool) -> Result<Self, RepositoryError> {
        let rows = db::settings::load_all(&pool).await?;
        tracing::debug!(count = rows.len(), "loaded settings");

        Ok(Self::with_cache(
            MemoryStorage::from_snapshot(rows.into_iter().collect()),
            Some(pool),
        ))
    }

    fn with_cache(cache: MemoryStorage, pool: Option<PgPool>) -> Self {
        Self {
            cache,
            pool,
            dirty: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns `true` if changes survive a restart.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    /// Returns `true` if some changes have not been flushed.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.dirty.lock().is_empty()
    }

    /// Re-read `key` from the database into the cache.
    ///
    /// Picks up changes made by other processes, such as the CLI. A key with
    /// unflushed local changes is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails; the cache is unchanged.
    pub async fn reload(&self, key: &str) -> Result<(), RepositoryError> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        let stored = db::settings::get_setting(pool, key).await?;

        let dirty = self.dirty.lock();
        if dirty.contains_key(key) {
            return Ok(());
        }
        match stored {
            Some(value) => self.cache.set_item(key, value)?,
            None => self.cache.remove_item(key)?,
        }
        Ok(())
    }

    /// Persist every changed key.
    ///
    /// A key that fails to persist is reverted to its last persisted value.
    ///
    /// # Errors
    ///
    /// Returns the first database error encountered.
    pub async fn flush(&self) -> Result<(), RepositoryError> {
        let changes = std::mem::take(&mut *self.dirty.lock());
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        let mut result = Ok(());
        for (key, persisted) in changes {
            if let Err(e) = self.persist(pool, &key).await {
                tracing::warn!(key = %key, error = %e, "failed to persist setting, reverting");
                if let Err(e) = self.restore(&key, persisted) {
                    tracing::error!(key = %key, error = %e, "failed to revert setting");
                }
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    async fn persist(&self, pool: &PgPool, key: &str) -> Result<(), RepositoryError> {
        match self.cache.get_item(key)? {
            Some(value) => db::settings::set_setting(pool, key, &value).await,
            None => db::settings::delete_setting(pool, key).await,
        }
    }

    fn restore(&self, key: &str, value: Option<String>) -> Result<(), StorageError> {
        match value {
            Some(value) => self.cache.set_item(key, value),
            None => self.cache.remove_item(key),
        }
    }

    fn change(&self, key: &str, value: Option<String>) -> Result<(), StorageError> {
        let mut dirty = self.dirty.lock();
        let previous = self.cache.get_item(key)?;
        self.restore(key, value)?;
        dirty.entry(key.to_owned()).or_insert(previous);
        Ok(())
    }
}

impl Storage for SettingsStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.cache.get_item(key)
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.change(key, Some(value))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.change(key, None)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.cache.keys()
    }
}
