use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use cds_model::Dictionary;
use tracing::debug;

use crate::provider::{DictionaryError, DictionaryProvider};

/// Write-once, read-many cache with unbounded lifetime.
///
/// Valid only for keys whose values are immutable once published. The load
/// runs outside the lock, so two concurrent first requests for the same key
/// may both fetch; the second insert wins and the duplicate fetch is the
/// accepted cost (no deadlock, no double-checked locking).
#[derive(Debug)]
pub struct VersionCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for VersionCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> VersionCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn get_or_try_load<E>(
        &self,
        key: &K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let loaded = Arc::new(load()?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .entry(key.clone())
            .or_insert_with(|| Arc::clone(&loaded))
            .clone())
    }
}

/// Caching wrapper over a `DictionaryProvider`.
///
/// Published (name, version) pairs are cached for the process lifetime;
/// `fetch_latest_dictionary` always passes through because "latest" moves.
pub struct CachedDictionaryProvider<P> {
    inner: P,
    cache: VersionCache<(String, String), Dictionary>,
}

impl<P: DictionaryProvider> CachedDictionaryProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: VersionCache::new(),
        }
    }
}

impl<P: DictionaryProvider> DictionaryProvider for CachedDictionaryProvider<P> {
    fn fetch_dictionary(&self, name: &str, version: &str) -> Result<Dictionary, DictionaryError> {
        let key = (name.to_string(), version.to_string());
        let dictionary = self.cache.get_or_try_load(&key, || {
            debug!(name, version, "loading dictionary");
            self.inner.fetch_dictionary(name, version)
        })?;
        Ok(Dictionary::clone(&dictionary))
    }

    fn fetch_latest_dictionary(&self, language: &str) -> Result<Dictionary, DictionaryError> {
        self.inner.fetch_latest_dictionary(language)
    }
}
